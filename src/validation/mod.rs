//! Named, composable validators for request parameters.

mod validators;

pub use validators::*;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Caller-facing vocabulary for request parameters. Every response type keys
/// its inputs by these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    Query,
    BrowseId,
    Continuation,
    VisitorData,
    Params,
    MovingVideoId,
    VideoBeforeId,
    PlaylistEditToken,
    #[serde(rename = "customURL")]
    CustomUrl,
    Text,
    Privacy,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Query => "query",
            ParameterKind::BrowseId => "browseId",
            ParameterKind::Continuation => "continuation",
            ParameterKind::VisitorData => "visitorData",
            ParameterKind::Params => "params",
            ParameterKind::MovingVideoId => "movingVideoId",
            ParameterKind::VideoBeforeId => "videoBeforeId",
            ParameterKind::PlaylistEditToken => "playlistEditToken",
            ParameterKind::CustomUrl => "customURL",
            ParameterKind::Text => "text",
            ParameterKind::Privacy => "privacy",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMap(BTreeMap<ParameterKind, String>);

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ParameterKind, value: impl Into<String>) -> Self {
        self.0.insert(kind, value.into());
        self
    }

    pub fn get(&self, kind: ParameterKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: ParameterKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterKind, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(ParameterKind, S)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (ParameterKind, S)>>(iter: I) -> Self {
        ParameterMap(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub parameter: ParameterKind,
    pub validator: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(parameter: ParameterKind, validator: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError {
            parameter,
            validator: validator.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.parameter, self.reason, self.validator)
    }
}

type CheckFn = dyn Fn(&str) -> Result<String, String> + Send + Sync;

#[derive(Clone)]
enum Check {
    Single(Arc<CheckFn>),
    Chain(Arc<ParameterValidator>, Arc<ParameterValidator>),
}

/// A pure check-and-transform step for one parameter.
///
/// Absent values only reach the check when `needs_existence` is false, in
/// which case they are accepted as absent.
#[derive(Clone)]
pub struct ParameterValidator {
    name: Cow<'static, str>,
    needs_existence: bool,
    check: Check,
}

impl fmt::Debug for ParameterValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterValidator")
            .field("name", &self.name)
            .field("needs_existence", &self.needs_existence)
            .finish()
    }
}

impl ParameterValidator {
    pub fn new<F>(name: &'static str, needs_existence: bool, check: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        ParameterValidator {
            name: Cow::Borrowed(name),
            needs_existence,
            check: Check::Single(Arc::new(check)),
        }
    }

    /// Runs `first`, then feeds its accepted value into `second`.
    pub fn combine(first: ParameterValidator, second: ParameterValidator) -> Self {
        ParameterValidator {
            name: Cow::Owned(format!("{}+{}", first.name, second.name)),
            needs_existence: first.needs_existence || second.needs_existence,
            check: Check::Chain(Arc::new(first), Arc::new(second)),
        }
    }

    pub fn then(self, next: ParameterValidator) -> Self {
        ParameterValidator::combine(self, next)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn needs_existence(&self) -> bool {
        self.needs_existence
    }

    pub fn validate(&self, kind: ParameterKind, raw: Option<&str>) -> Result<Option<String>, ValidationError> {
        match &self.check {
            Check::Chain(first, second) => match first.validate(kind, raw)? {
                Some(value) => second.validate(kind, Some(&value)),
                None if second.needs_existence => second.validate(kind, None),
                None => Ok(None),
            },
            Check::Single(check) => match raw {
                Some(value) => check(value)
                    .map(Some)
                    .map_err(|reason| ValidationError::new(kind, self.name.as_ref(), reason)),
                None if self.needs_existence => Err(ValidationError::new(
                    kind,
                    self.name.as_ref(),
                    "parameter is required but was not provided",
                )),
                None => Ok(None),
            },
        }
    }
}

/// Parameters that passed validation, possibly rewritten by their validators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedParameters(BTreeMap<ParameterKind, String>);

impl ValidatedParameters {
    pub fn get(&self, kind: ParameterKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }
}

/// Evaluates every declared validator against `provided`, collecting all
/// rejections. Required kinds without a declared validator get an existence
/// check. Undeclared parameters pass through unchanged.
pub fn validate_parameters(
    provided: &ParameterMap,
    declared: &[(ParameterKind, ParameterValidator)],
    required: &[ParameterKind],
) -> Result<ValidatedParameters, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut validated: BTreeMap<ParameterKind, String> = provided
        .iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

    for kind in required {
        if declared.iter().any(|(k, _)| k == kind) {
            continue;
        }
        if let Err(e) = existence().validate(*kind, provided.get(*kind)) {
            errors.push(e);
        }
    }

    for (kind, validator) in declared {
        let validator = if required.contains(kind) && !validator.needs_existence() {
            existence().then(validator.clone())
        } else {
            validator.clone()
        };
        match validator.validate(*kind, provided.get(*kind)) {
            Ok(Some(value)) => {
                validated.insert(*kind, value);
            }
            Ok(None) => {
                validated.remove(kind);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(ValidatedParameters(validated))
    } else {
        Err(errors)
    }
}
