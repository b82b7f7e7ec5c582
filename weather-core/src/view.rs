//! The element contract the widget renders into.

use std::{collections::HashMap, fmt};

use crate::model::HourlyRow;

/// Every element the widget touches, keyed by its markup id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    CityInput,
    GetWeatherButton,
    ErrorMessage,
    WeatherContainer,
    HourlyContainer,
    CityName,
    CurrentTemp,
    CurrentPressure,
    CurrentRain,
    TomorrowMin,
    TomorrowMax,
    CurrentHumidity,
    CurrentCloud,
    CurrentWindSpeed,
    CurrentWindDirection,
}

impl ElementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::CityInput => "city-input",
            ElementId::GetWeatherButton => "get-weather-btn",
            ElementId::ErrorMessage => "error-message",
            ElementId::WeatherContainer => "weather-container",
            ElementId::HourlyContainer => "hourly-container",
            ElementId::CityName => "city-name",
            ElementId::CurrentTemp => "current-temp",
            ElementId::CurrentPressure => "current-pressure",
            ElementId::CurrentRain => "current-rain",
            ElementId::TomorrowMin => "tomorrow-min",
            ElementId::TomorrowMax => "tomorrow-max",
            ElementId::CurrentHumidity => "current-humidity",
            ElementId::CurrentCloud => "current-cloud",
            ElementId::CurrentWindSpeed => "current-wind-speed",
            ElementId::CurrentWindDirection => "current-wind-direction",
        }
    }

    pub const fn all() -> &'static [ElementId] {
        &[
            ElementId::CityInput,
            ElementId::GetWeatherButton,
            ElementId::ErrorMessage,
            ElementId::WeatherContainer,
            ElementId::HourlyContainer,
            ElementId::CityName,
            ElementId::CurrentTemp,
            ElementId::CurrentPressure,
            ElementId::CurrentRain,
            ElementId::TomorrowMin,
            ElementId::TomorrowMax,
            ElementId::CurrentHumidity,
            ElementId::CurrentCloud,
            ElementId::CurrentWindSpeed,
            ElementId::CurrentWindDirection,
        ]
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ElementId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ElementId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| anyhow::anyhow!("Unknown element id '{value}'."))
    }
}

/// Write access to the rendered document.
///
/// Implementations own the element handles; the widget only refers to them by
/// [`ElementId`]. All methods are synchronous and never suspend.
pub trait View: Send {
    /// Current value of an input element.
    fn value(&self, id: ElementId) -> String;

    /// Replace the value of an input element, as typing would.
    fn set_value(&mut self, id: ElementId, value: &str);

    /// Replace the text content of an element.
    fn set_text(&mut self, id: ElementId, text: &str);

    /// Toggle the `hidden` class.
    fn set_hidden(&mut self, id: ElementId, hidden: bool);

    /// Toggle the `disabled` attribute of a control.
    fn set_disabled(&mut self, id: ElementId, disabled: bool);

    /// Remove every child of a container.
    fn clear_children(&mut self, id: ElementId);

    /// Append one `hour-item` row to a container.
    fn append_row(&mut self, id: ElementId, row: HourlyRow);
}

/// State of one element in a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub value: String,
    pub hidden: bool,
    pub disabled: bool,
    pub rows: Vec<HourlyRow>,
}

/// In-memory document holding every element of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    elements: HashMap<ElementId, Element>,
}

impl Document {
    /// Markup as served: banner and result panel hidden, button labelled with
    /// `button_label`.
    pub fn new(button_label: &str) -> Self {
        let mut elements: HashMap<ElementId, Element> = ElementId::all()
            .iter()
            .map(|id| (*id, Element::default()))
            .collect();

        for id in [ElementId::ErrorMessage, ElementId::WeatherContainer] {
            if let Some(el) = elements.get_mut(&id) {
                el.hidden = true;
            }
        }
        if let Some(button) = elements.get_mut(&ElementId::GetWeatherButton) {
            button.text = button_label.to_owned();
        }

        Self { elements }
    }

    pub fn element(&self, id: ElementId) -> &Element {
        // `new` populates every id, so the lookup cannot miss.
        &self.elements[&id]
    }

    fn element_mut(&mut self, id: ElementId) -> &mut Element {
        self.elements.entry(id).or_default()
    }

    pub fn text(&self, id: ElementId) -> &str {
        &self.element(id).text
    }

    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.element(id).hidden
    }

    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.element(id).disabled
    }

    pub fn rows(&self, id: ElementId) -> &[HourlyRow] {
        &self.element(id).rows
    }
}

impl View for Document {
    fn value(&self, id: ElementId) -> String {
        self.element(id).value.clone()
    }

    fn set_value(&mut self, id: ElementId, value: &str) {
        self.element_mut(id).value = value.to_owned();
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        self.element_mut(id).text = text.to_owned();
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.element_mut(id).hidden = hidden;
    }

    fn set_disabled(&mut self, id: ElementId, disabled: bool) {
        self.element_mut(id).disabled = disabled;
    }

    fn clear_children(&mut self, id: ElementId) {
        self.element_mut(id).rows.clear();
    }

    fn append_row(&mut self, id: ElementId, row: HourlyRow) {
        self.element_mut(id).rows.push(row);
    }
}
