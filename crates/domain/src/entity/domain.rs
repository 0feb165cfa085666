//! The closed vocabulary of entity domains.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_domains {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Domain of an entity, taken from its identifier prefix.
        ///
        /// Mapping from a prefix is total: unknown prefixes become
        /// [`Domain::Other`] instead of failing.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum Domain {
            $($variant,)+
            Other(String),
        }

        impl Domain {
            /// Every domain with dedicated details, in declaration order.
            pub const KNOWN: &'static [Domain] = &[$(Domain::$variant),+];

            /// Map an identifier prefix onto the vocabulary.
            #[must_use]
            pub fn parse(prefix: &str) -> Self {
                match prefix {
                    $($name => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            /// Wire name of the domain.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Other(name) => name,
                }
            }
        }
    };
}

define_domains! {
    Automation => "automation",
    BinarySensor => "binary_sensor",
    Climate => "climate",
    DeviceTracker => "device_tracker",
    Fan => "fan",
    GarageDoor => "garage_door",
    Group => "group",
    InputBoolean => "input_boolean",
    InputSelect => "input_select",
    InputSlider => "input_slider",
    Light => "light",
    Lock => "lock",
    MediaPlayer => "media_player",
    Scene => "scene",
    Script => "script",
    Sensor => "sensor",
    Sun => "sun",
    Switch => "switch",
    Thermostat => "thermostat",
    Weblink => "weblink",
    Zone => "zone",
}

impl Domain {
    /// Whether this prefix is outside the known vocabulary.
    #[must_use]
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Domain {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.as_str().to_string()
    }
}
