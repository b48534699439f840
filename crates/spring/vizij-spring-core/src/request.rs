//! Declarative requests the orchestrator hands to the bridge.
//!
//! Requests are plain data. [`crate::SpringRegistry::add`] dispatches on the variant;
//! new kinds of request extend [`Request`].

use crate::config::SpringConfig;
use crate::error::{BridgeError, Result};
use crate::ids::GestureId;
use crate::property::Property;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Pull a property towards a destination using a spring.
///
/// When several requests target the same property, the last one's destination and
/// configuration win.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetargetRequest {
    pub property: Property,
    pub destination: Value,
    /// `None` uses [`SpringConfig::default`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SpringConfig>,
}

impl RetargetRequest {
    pub fn new(property: Property, destination: Value) -> Self {
        Self {
            property,
            destination,
            configuration: None,
        }
    }

    pub fn with_configuration(mut self, configuration: SpringConfig) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Configuration this request resolves to.
    pub fn spring_config(&self) -> SpringConfig {
        self.configuration.unwrap_or_default()
    }
}

/// Pause a property's spring while a gesture recognizer is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRequest {
    pub property: Property,
    pub gesture: GestureId,
}

/// Fire-and-forget spring: not keyed, never gated, dropped from the engine on stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneShotRequest {
    pub property: Property,
    pub destination: Value,
    /// Start value; `None` starts from whatever the target currently holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SpringConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    SpringTo(RetargetRequest),
    PauseSpring(PauseRequest),
    OneShot(OneShotRequest),
}

impl Request {
    pub fn property(&self) -> Property {
        match self {
            Request::SpringTo(r) => r.property,
            Request::PauseSpring(r) => r.property,
            Request::OneShot(r) => r.property,
        }
    }
}

impl From<RetargetRequest> for Request {
    fn from(r: RetargetRequest) -> Self {
        Request::SpringTo(r)
    }
}

impl From<PauseRequest> for Request {
    fn from(r: PauseRequest) -> Self {
        Request::PauseSpring(r)
    }
}

impl From<OneShotRequest> for Request {
    fn from(r: OneShotRequest) -> Self {
        Request::OneShot(r)
    }
}

/// Shape-check a destination against the property it is meant for.
pub(crate) fn check_destination(property: Property, destination: &Value) -> Result<()> {
    let expected = property.value_kind();
    let actual = destination.kind();
    if expected == actual {
        Ok(())
    } else {
        Err(BridgeError::ValueKindMismatch {
            property,
            expected,
            actual,
        })
    }
}

/// Decode a request from its JSON form.
///
/// ```
/// use vizij_spring_core::{parse_request_json, Property, Request};
///
/// let req = parse_request_json(
///     r#"{"type":"SpringTo","property":"opacity","destination":{"type":"Float","data":1.0}}"#,
/// )
/// .unwrap();
/// assert_eq!(req.property(), Property::Opacity);
/// assert!(matches!(req, Request::SpringTo(_)));
/// ```
pub fn parse_request_json(json: &str) -> Result<Request> {
    let request: Request = serde_json::from_str(json)?;
    match &request {
        Request::SpringTo(r) => {
            check_destination(r.property, &r.destination)?;
            r.spring_config().validate()?;
        }
        Request::OneShot(r) => {
            check_destination(r.property, &r.destination)?;
            if let Some(from) = &r.from {
                check_destination(r.property, from)?;
            }
            r.configuration.unwrap_or_default().validate()?;
        }
        Request::PauseSpring(_) => {}
    }
    Ok(request)
}
