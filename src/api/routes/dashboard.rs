//! Dashboard Route
//!
//! - GET / - Occupancy page that polls /api/status

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::config::{DashboardConfig, MIN_POLL_INTERVAL_MS};

const TEMPLATE: &str = include_str!("../../../assets/dashboard.html");
const POLL_PLACEHOLDER: &str = "{{POLL_INTERVAL_MS}}";

/// Fill the page template with the configured refresh interval
pub fn render(config: &DashboardConfig) -> String {
    let interval = config.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
    TEMPLATE.replace(POLL_PLACEHOLDER, &interval.to_string())
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.dashboard_html.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_interval() {
        let html = render(&DashboardConfig::default());
        assert!(html.contains("const POLL_INTERVAL_MS = 5000;"));
        assert!(!html.contains(POLL_PLACEHOLDER));
        assert!(html.contains("/api/status"));
    }

    #[test]
    fn test_render_custom_interval() {
        let html = render(&DashboardConfig {
            poll_interval_ms: 1500,
        });
        assert!(html.contains("const POLL_INTERVAL_MS = 1500;"));
    }

    #[test]
    fn test_render_zero_interval_uses_floor() {
        let html = render(&DashboardConfig {
            poll_interval_ms: 0,
        });
        assert!(html.contains("const POLL_INTERVAL_MS = 500;"));
    }
}
