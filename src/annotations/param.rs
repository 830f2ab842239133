use serde_json::Value;

use crate::error::ConfigError;
use crate::metadata::{MetadataStore, ParameterDescriptor, ParameterRole, Target};

/// Describes one formal parameter of a member
///
/// Applied at a position through `MethodDecl::param`. Body, query and path
/// parameters take their declared type from the member signature at that
/// position.
#[derive(Debug, Clone)]
pub struct ParamBinder {
    role: ParameterRole,
    key: String,
    summary: Option<String>,
    example: Option<Value>,
    required: Option<bool>,
    deprecated: Option<bool>,
}

impl ParamBinder {
    fn new(role: ParameterRole, key: &str) -> Self {
        Self {
            role,
            key: key.to_string(),
            summary: None,
            example: None,
            required: None,
            deprecated: None,
        }
    }

    #[must_use]
    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    #[must_use]
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    #[must_use]
    pub fn role(&self) -> ParameterRole {
        self.role
    }

    /// Write the descriptor at `index` of the member's parameter list
    ///
    /// # Errors
    ///
    /// * [`ConfigError::MissingSignature`] when the role needs a declared type
    ///   and the member has no signature.
    /// * [`ConfigError::ParameterIndexOutOfRange`] when `index` is not below
    ///   the member arity.
    pub fn bind(
        self,
        store: &mut MetadataStore,
        target: Target,
        member: &str,
        index: usize,
    ) -> Result<(), ConfigError> {
        let declared_type = match store.param_types(target, member) {
            Some(types) => {
                if index >= types.len() {
                    return Err(ConfigError::ParameterIndexOutOfRange {
                        target: target.name(),
                        member: member.to_string(),
                        index,
                        arity: types.len(),
                    });
                }
                if self.role.needs_declared_type() {
                    Some(types[index].clone())
                } else {
                    None
                }
            }
            None if self.role.needs_declared_type() => {
                return Err(ConfigError::MissingSignature {
                    target: target.name(),
                    member: member.to_string(),
                });
            }
            None => None,
        };

        store.set_parameter(
            target,
            member,
            index,
            ParameterDescriptor {
                key: self.key,
                role: self.role,
                declared_type,
                summary: self.summary,
                example: self.example,
                required: self.required,
                deprecated: self.deprecated,
            },
        );
        Ok(())
    }
}

/// A field of the request body
#[must_use]
pub fn body_field(key: &str) -> ParamBinder {
    ParamBinder::new(ParameterRole::BodyField, key)
}

/// A query-string field
#[must_use]
pub fn query(key: &str) -> ParamBinder {
    ParamBinder::new(ParameterRole::QueryField, key)
}

/// A path segment; path parameters are required
#[must_use]
pub fn url_param(key: &str) -> ParamBinder {
    ParamBinder::new(ParameterRole::UrlSegment, key).required(true)
}

/// Inject the inbound request
#[must_use]
pub fn request() -> ParamBinder {
    ParamBinder::new(ParameterRole::InjectRequest, "request")
}

/// Inject the response channel
#[must_use]
pub fn response() -> ParamBinder {
    ParamBinder::new(ParameterRole::InjectResponse, "response")
}
