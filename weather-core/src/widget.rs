//! The weather widget: input handling, one request per submission, rendering.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::{
    backend::WeatherBackend,
    config::Labels,
    model::WeatherResponse,
    view::{ElementId, View},
};

/// User interaction the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Click on `get-weather-btn`.
    ButtonClick,
    /// Key press inside `city-input`, carrying the key name (`"Enter"`, `"a"`, ...).
    KeyPress(String),
}

impl UiEvent {
    /// Whether this event submits the form.
    pub fn is_submit(&self) -> bool {
        match self {
            UiEvent::ButtonClick => true,
            UiEvent::KeyPress(key) => key == "Enter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    Loading,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty input or a non-submitting event; nothing happened.
    Ignored,
    /// The response was rendered into the result panel.
    Rendered,
    /// The error banner shows this message.
    Failed(String),
    /// A newer submission was made before this one settled; its result was dropped.
    Stale,
}

struct Shared<V> {
    view: V,
    /// Token of the submission whose result will be shown, if one is in flight.
    pending: Option<u64>,
}

/// The widget. Element handles live in `V`; data comes from `B`.
pub struct WeatherWidget<B, V> {
    backend: B,
    labels: Labels,
    shared: Mutex<Shared<V>>,
    next_token: AtomicU64,
}

impl<B, V> std::fmt::Debug for WeatherWidget<B, V>
where
    B: WeatherBackend,
    V: View,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherWidget")
            .field("backend", &self.backend)
            .field("labels", &self.labels)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<B, V> WeatherWidget<B, V>
where
    B: WeatherBackend,
    V: View,
{
    pub fn new(backend: B, view: V, labels: Labels) -> Self {
        Self {
            backend,
            labels,
            shared: Mutex::new(Shared {
                view,
                pending: None,
            }),
            next_token: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> WidgetState {
        if self.shared.lock().pending.is_some() {
            WidgetState::Loading
        } else {
            WidgetState::Idle
        }
    }

    /// Read the view without holding the lock across an await.
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.shared.lock().view)
    }

    pub fn into_view(self) -> V {
        self.shared.into_inner().view
    }

    /// Type `text` into the city input.
    pub fn set_input(&self, text: &str) {
        self.shared.lock().view.set_value(ElementId::CityInput, text);
    }

    /// Dispatch a UI event. Clicks and Enter submit; other keys are ignored.
    pub async fn handle(&self, event: UiEvent) -> Outcome {
        if event.is_submit() {
            self.fetch_weather().await
        } else {
            Outcome::Ignored
        }
    }

    /// Submit the current city input.
    pub async fn fetch_weather(&self) -> Outcome {
        let city = self.with_view(|view| view.value(ElementId::CityInput).trim().to_owned());
        if city.is_empty() {
            debug!("Empty city input, nothing to fetch");
            return Outcome::Ignored;
        }

        let token = self.begin();
        let _restore = RestoreControls {
            widget: self,
            token,
        };

        info!(%city, token, "Fetching weather");
        let result = self.backend.fetch(&city).await;

        let mut shared = self.shared.lock();
        if shared.pending != Some(token) {
            warn!(%city, token, "Discarding result of superseded request");
            return Outcome::Stale;
        }

        match result {
            Ok(data) => {
                render(&mut shared.view, &data);
                Outcome::Rendered
            }
            Err(err) => {
                warn!(%city, error = %err, "Weather request failed");
                let message = err.user_message(&self.labels.fallback_error).to_owned();
                show_error(&mut shared.view, &message);
                Outcome::Failed(message)
            }
        }
    }

    /// Render a response into the result panel and reveal it.
    pub fn update_ui(&self, data: &WeatherResponse) {
        render(&mut self.shared.lock().view, data);
    }

    /// Show `message` in the error banner.
    pub fn show_error(&self, message: &str) {
        show_error(&mut self.shared.lock().view, message);
    }

    fn begin(&self) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;

        let mut shared = self.shared.lock();
        if let Some(previous) = shared.pending.replace(token) {
            debug!(previous, token, "Superseding in-flight request");
        }

        let view = &mut shared.view;
        view.set_hidden(ElementId::ErrorMessage, true);
        view.set_hidden(ElementId::WeatherContainer, true);
        view.set_disabled(ElementId::GetWeatherButton, true);
        view.set_text(ElementId::GetWeatherButton, &self.labels.loading);

        token
    }

    /// Return the controls to idle, unless a newer submission owns them.
    fn finish(&self, token: u64) {
        let mut shared = self.shared.lock();
        if shared.pending != Some(token) {
            return;
        }
        shared.pending = None;
        shared.view.set_disabled(ElementId::GetWeatherButton, false);
        shared
            .view
            .set_text(ElementId::GetWeatherButton, &self.labels.idle);
    }
}

/// Restores the trigger when a submission ends, however it ends.
struct RestoreControls<'a, B, V>
where
    B: WeatherBackend,
    V: View,
{
    widget: &'a WeatherWidget<B, V>,
    token: u64,
}

impl<B, V> Drop for RestoreControls<'_, B, V>
where
    B: WeatherBackend,
    V: View,
{
    fn drop(&mut self) {
        self.widget.finish(self.token);
    }
}

fn render<V: View>(view: &mut V, data: &WeatherResponse) {
    view.set_text(ElementId::CityName, &data.city);
    view.set_text(ElementId::CurrentTemp, &data.current_temp.to_string());
    view.set_text(ElementId::CurrentPressure, &data.current_pressure.to_string());
    view.set_text(ElementId::CurrentRain, &data.current_rain.to_string());
    view.set_text(ElementId::TomorrowMin, &data.tomorrow_min.to_string());
    view.set_text(ElementId::TomorrowMax, &data.tomorrow_max.to_string());

    let extras = [
        (ElementId::CurrentHumidity, &data.current_humidity),
        (ElementId::CurrentCloud, &data.current_cloud),
        (ElementId::CurrentWindSpeed, &data.current_wind_speed),
        (ElementId::CurrentWindDirection, &data.current_wind_direction),
    ];
    // Absent extras are blanked so a previous city's value never lingers.
    for (id, value) in extras {
        let text = value.as_ref().map(ToString::to_string).unwrap_or_default();
        view.set_text(id, &text);
    }

    if !data.is_aligned() {
        warn!(
            labels = data.hour_labels.len(),
            temps = data.hour_temps.len(),
            "Hourly labels and temperatures differ in length, dropping unmatched entries"
        );
    }

    view.clear_children(ElementId::HourlyContainer);
    for row in data.hourly_rows() {
        view.append_row(ElementId::HourlyContainer, row);
    }

    view.set_hidden(ElementId::WeatherContainer, false);
}

fn show_error<V: View>(view: &mut V, message: &str) {
    view.set_text(ElementId::ErrorMessage, message);
    view.set_hidden(ElementId::ErrorMessage, false);
}
