//! Per-profile request authentication.
//!
//! A `CredentialStrategy` is rebuilt from the profile every time it is
//! needed and holds no signing state, so switching the active profile takes
//! effect on the very next request.

use std::fmt;
use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use base64::prelude::*;
use http::header::{HeaderValue, AUTHORIZATION};

use super::errors::SigningError;
use super::transport::OutboundRequest;
use crate::storage::profile::{AuthConfig, ConnectionProfile};

/// Signing service name for managed Elasticsearch / OpenSearch domains.
pub const DEFAULT_IAM_SERVICE: &str = "es";

#[derive(Clone)]
pub enum CredentialStrategy {
    Basic(BasicAuth),
    Iam(IamSigner),
}

#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

#[derive(Clone)]
pub struct IamSigner {
    region: String,
    access_key: String,
    secret_key: String,
    service: String,
}

impl CredentialStrategy {
    pub fn for_profile(profile: &ConnectionProfile, iam_service: &str) -> Self {
        match &profile.auth {
            AuthConfig::Basic { username, password } => CredentialStrategy::Basic(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            AuthConfig::Iam {
                region,
                access_key,
                secret_key,
            } => CredentialStrategy::Iam(IamSigner {
                region: region.clone(),
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                service: iam_service.to_string(),
            }),
        }
    }

    /// Attach credentials to `request`. Never returns an unsigned request.
    pub fn authenticate(&self, request: OutboundRequest) -> Result<OutboundRequest, SigningError> {
        match self {
            CredentialStrategy::Basic(basic) => basic.apply(request),
            CredentialStrategy::Iam(iam) => iam.sign_at(request, SystemTime::now()),
        }
    }

    /// For IAM, a request that cannot be built cannot be canonicalized either,
    /// so the failure is a signing failure. Basic auth has no such step.
    pub(crate) fn canonicalization_error(&self, reason: &str) -> Option<SigningError> {
        match self {
            CredentialStrategy::Basic(_) => None,
            CredentialStrategy::Iam(_) => Some(SigningError(format!(
                "Cannot canonicalize request for signing: {}",
                reason
            ))),
        }
    }
}

impl BasicAuth {
    pub fn apply(&self, mut request: OutboundRequest) -> Result<OutboundRequest, SigningError> {
        let token = BASE64_STANDARD.encode(format!("{}:{}", self.username, self.password));
        let mut value = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| SigningError(e.to_string()))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(request)
    }
}

impl IamSigner {
    /// SigV4-sign `request` as of `time`, adding `authorization` and `x-amz-date`.
    pub fn sign_at(
        &self,
        mut request: OutboundRequest,
        time: SystemTime,
    ) -> Result<OutboundRequest, SigningError> {
        let credentials = Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            "ruskview",
        );
        let identity = Identity::new(credentials, None);

        let v4_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(time)
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| SigningError(e.to_string()))?;
        let signing_params = SigningParams::V4(v4_params);

        let uri = request.uri().to_string();
        let mut headers = Vec::with_capacity(request.headers().len());
        for (name, value) in request.headers() {
            let value = value
                .to_str()
                .map_err(|_| SigningError(format!("header '{}' is not printable ASCII", name)))?;
            headers.push((name.as_str(), value));
        }

        let signable = SignableRequest::new(
            request.method().as_str(),
            uri,
            headers.into_iter(),
            SignableBody::Bytes(request.body()),
        )
        .map_err(|e| SigningError(e.to_string()))?;

        let (instructions, _signature) = sign(signable, &signing_params)
            .map_err(|e| SigningError(e.to_string()))?
            .into_parts();
        instructions.apply_to_request_http1x(&mut request);
        Ok(request)
    }
}

impl fmt::Debug for CredentialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStrategy::Basic(b) => write!(f, "Basic({})", b.username),
            CredentialStrategy::Iam(i) => {
                write!(f, "Iam({} in {} for {})", i.access_key, i.region, i.service)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::transport::build_request;
    use http::Method;

    fn profile(auth: AuthConfig) -> ConnectionProfile {
        ConnectionProfile::new("t", "https://search.example.com", auth)
    }

    fn request() -> OutboundRequest {
        build_request("https://search.example.com", Method::GET, "/_cluster/health", None).unwrap()
    }

    #[test]
    fn basic_adds_exactly_one_auth_header_and_no_sigv4_headers() {
        let strategy = CredentialStrategy::for_profile(&profile(AuthConfig::basic("admin", "admin")), "es");
        let signed = strategy.authenticate(request()).unwrap();

        let auth: Vec<_> = signed.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0], "Basic YWRtaW46YWRtaW4=");
        assert!(signed.headers().get("x-amz-date").is_none());
    }

    #[test]
    fn iam_signs_with_region_and_service_scope() {
        let strategy = CredentialStrategy::for_profile(
            &profile(AuthConfig::iam("eu-west-1", "AKIDEXAMPLE", "secret")),
            "es",
        );
        let signed = strategy.authenticate(request()).unwrap();

        let auth: Vec<_> = signed.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(auth.len(), 1);
        let auth = auth[0].to_str().unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(auth.contains("/eu-west-1/es/aws4_request"));
        assert!(!auth.starts_with("Basic"));
        assert!(signed.headers().get("x-amz-date").is_some());
    }

    #[test]
    fn iam_signature_depends_on_the_body() {
        let signer = IamSigner {
            region: "us-east-1".into(),
            access_key: "AKID".into(),
            secret_key: "secret".into(),
            service: "es".into(),
        };
        let at = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let sign_body = |body: &[u8]| {
            let req = build_request(
                "https://search.example.com",
                Method::POST,
                "/_search",
                Some(body.to_vec()),
            )
            .unwrap();
            signer.sign_at(req, at).unwrap().headers()[AUTHORIZATION].clone()
        };

        assert_eq!(sign_body(b"{}"), sign_body(b"{}"));
        assert_ne!(sign_body(b"{}"), sign_body(br#"{"size":0}"#));
    }

    #[test]
    fn debug_never_prints_secrets() {
        let strategy = CredentialStrategy::for_profile(
            &profile(AuthConfig::iam("eu-west-1", "AKID", "very-secret")),
            "es",
        );
        assert!(!format!("{:?}", strategy).contains("very-secret"));
    }
}
