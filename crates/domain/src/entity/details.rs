//! Domain-specific details computed from an entity's state and attributes.

use serde::{Deserialize, Serialize};

use super::attribute_value::Attributes;
use super::climate::{Climate, Thermostat};
use super::domain::Domain;
use super::group::{Group, Scene};
use super::location::{DeviceTracker, Zone};
use super::media_player::MediaPlayer;
use super::sensor::{InputSelect, InputSlider, Sensor, Sun, Weblink};
use super::switchable::{Fan, GarageDoor, Light, Lock, Toggle};
use crate::time::TimestampTransform;

/// One variant per known [`Domain`]; everything else is [`EntityDetails::Generic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDetails {
    Automation(Toggle),
    BinarySensor(Toggle),
    Climate(Climate),
    DeviceTracker(DeviceTracker),
    Fan(Fan),
    GarageDoor(GarageDoor),
    Group(Group),
    InputBoolean(Toggle),
    InputSelect(InputSelect),
    InputSlider(InputSlider),
    Light(Light),
    Lock(Lock),
    MediaPlayer(MediaPlayer),
    Scene(Scene),
    Script(Toggle),
    Sensor(Sensor),
    Sun(Sun),
    Switch(Toggle),
    Thermostat(Thermostat),
    Weblink(Weblink),
    Zone(Zone),
    Generic,
}

impl EntityDetails {
    /// Select and compute the details for `domain`.
    ///
    /// Selection is total: unknown domains yield [`EntityDetails::Generic`].
    #[must_use]
    pub fn compute(
        domain: &Domain,
        state: &str,
        attributes: &Attributes,
        timestamps: &TimestampTransform,
    ) -> Self {
        match domain {
            Domain::Automation => Self::Automation(Toggle::from_state(state)),
            Domain::BinarySensor => Self::BinarySensor(Toggle::from_state(state)),
            Domain::Climate => Self::Climate(Climate::from_attributes(attributes)),
            Domain::DeviceTracker => {
                Self::DeviceTracker(DeviceTracker::from_state(state, attributes))
            }
            Domain::Fan => Self::Fan(Fan::from_state(state, attributes)),
            Domain::GarageDoor => Self::GarageDoor(GarageDoor::from_state(state)),
            Domain::Group => Self::Group(Group::from_attributes(attributes)),
            Domain::InputBoolean => Self::InputBoolean(Toggle::from_state(state)),
            Domain::InputSelect => Self::InputSelect(InputSelect::from_attributes(attributes)),
            Domain::InputSlider => Self::InputSlider(InputSlider::from_state(state, attributes)),
            Domain::Light => Self::Light(Light::from_state(state, attributes)),
            Domain::Lock => Self::Lock(Lock::from_state(state)),
            Domain::MediaPlayer => Self::MediaPlayer(MediaPlayer::from_state(state, attributes)),
            Domain::Scene => Self::Scene(Scene::from_attributes(attributes)),
            Domain::Script => Self::Script(Toggle::from_state(state)),
            Domain::Sensor => Self::Sensor(Sensor::from_state(state, attributes)),
            Domain::Sun => Self::Sun(Sun::from_state(state, attributes, timestamps)),
            Domain::Switch => Self::Switch(Toggle::from_state(state)),
            Domain::Thermostat => Self::Thermostat(Thermostat::from_attributes(attributes)),
            Domain::Weblink => Self::Weblink(Weblink::from_state(state)),
            Domain::Zone => Self::Zone(Zone::from_attributes(attributes)),
            Domain::Other(_) => Self::Generic,
        }
    }

    /// On/off reading for every two-valued domain that speaks `on`/`off`.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        match self {
            Self::Automation(t)
            | Self::BinarySensor(t)
            | Self::InputBoolean(t)
            | Self::Script(t)
            | Self::Switch(t) => Some(t.is_on),
            Self::Fan(fan) => Some(fan.is_on),
            Self::Light(light) => Some(light.is_on),
            _ => None,
        }
    }

    /// Member identifiers of groups and scenes; empty for everything else.
    #[must_use]
    pub fn members(&self) -> &[crate::id::EntityId] {
        match self {
            Self::Group(group) => &group.members,
            Self::Scene(scene) => &scene.members,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(domain: &str, state: &str) -> EntityDetails {
        EntityDetails::compute(
            &Domain::parse(domain),
            state,
            &Attributes::new(),
            &TimestampTransform::default(),
        )
    }

    #[test]
    fn should_select_a_dedicated_variant_for_every_known_domain() {
        for domain in Domain::KNOWN {
            let details = EntityDetails::compute(
                domain,
                "",
                &Attributes::new(),
                &TimestampTransform::default(),
            );
            assert!(!details.is_generic(), "{domain} fell back to Generic");
        }
    }

    #[test]
    fn should_fall_back_to_generic_for_unknown_domain() {
        assert!(compute("foobar", "on").is_generic());
    }

    #[test]
    fn should_expose_is_on_for_on_off_domains_only() {
        assert_eq!(compute("switch", "on").is_on(), Some(true));
        assert_eq!(compute("light", "off").is_on(), Some(false));
        assert_eq!(compute("lock", "locked").is_on(), None);
    }
}
