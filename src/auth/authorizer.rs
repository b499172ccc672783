use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::auth::token::TokenIssuer;
use crate::db::models::Role;
use crate::db::store::CredentialStore;
use crate::error::{AppError, AuthError};

/// Principal attached to the request once the bearer token checks out.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Role guard evaluated after authentication: a mismatch is 403, not 401.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden.into())
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AuthError::Unauthenticated.into()),
        )
    }
}

/// Routes reachable without a bearer token, matched before any token work.
#[derive(Debug, Clone)]
pub struct PublicPaths {
    exact: Vec<&'static str>,
    prefixes: Vec<&'static str>,
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self {
            exact: vec!["/", "/health", "/auth/signup", "/auth/login", "/auth/refresh"],
            prefixes: vec!["/auth/email/"],
        }
    }
}

impl PublicPaths {
    pub fn matches(&self, path: &str) -> bool {
        self.exact.contains(&path) || self.prefixes.iter().any(|p| path.starts_with(p))
    }
}

/// Per-request bearer authentication: extract the token, validate it,
/// resolve the subject to a stored principal, and attach it to the request.
/// Every failure maps to a uniform 401; the precise token failure kind is
/// only logged.
pub struct RequestAuthorizer {
    tokens: Arc<TokenIssuer>,
    store: Arc<dyn CredentialStore>,
    public: Rc<PublicPaths>,
}

impl RequestAuthorizer {
    pub fn new(
        tokens: Arc<TokenIssuer>,
        store: Arc<dyn CredentialStore>,
        public: PublicPaths,
    ) -> Self {
        Self {
            tokens,
            store,
            public: Rc::new(public),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestAuthorizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = AuthorizerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizerMiddleware {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
            store: Arc::clone(&self.store),
            public: Rc::clone(&self.public),
        }))
    }
}

pub struct AuthorizerMiddleware<S> {
    service: Rc<S>,
    tokens: Arc<TokenIssuer>,
    store: Arc<dyn CredentialStore>,
    public: Rc<PublicPaths>,
}

impl<S, B> Service<ServiceRequest> for AuthorizerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let tokens = Arc::clone(&self.tokens);
        let store = Arc::clone(&self.store);
        let public = Rc::clone(&self.public);

        Box::pin(async move {
            if public.matches(req.path()) {
                return service.call(req).await.map(|res| res.map_into_left_body());
            }

            let unauthenticated = |req: ServiceRequest| {
                let response = AppError::from(AuthError::Unauthenticated).error_response();
                Ok(req.into_response(response).map_into_right_body())
            };

            let token = match bearer_token(req.request()) {
                Some(token) => token,
                None => {
                    return unauthenticated(req);
                }
            };

            let subject = match tokens.validate(&token) {
                Ok(subject) => subject,
                Err(kind) => {
                    warn!("bearer token rejected for {}: {}", req.path(), kind);
                    return unauthenticated(req);
                }
            };

            // A still-valid token whose account is gone gets the same 401.
            let user = match store.find_by_email(&subject).await? {
                Some(user) => user,
                None => {
                    warn!("bearer token subject {} has no account", subject);
                    return unauthenticated(req);
                }
            };

            req.extensions_mut().insert(AuthenticatedUser {
                id: user.id,
                email: user.email,
                role: user.role,
            });

            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
}
