use serde::Serialize;

use crate::models::{Feature, MetadataSource, PredictionResult, StateSnapshot, SubmissionState};
use crate::validation::{advisory_range, outside_advisory};

pub const PENDING_STATUS: &str = "Predicting…";
pub const IDLE_PLACEHOLDER: &str =
    "Enter soil parameters and click \"Predict Crop\" to get your recommendation";

// ==============================================================================
// RESULT VIEW
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropCard {
    pub glyph: &'static str,
    pub crop: String,
    pub category: &'static str,
    pub season: &'static str,
    pub water: &'static str,
    pub listed: bool,
}

impl From<&PredictionResult> for CropCard {
    fn from(result: &PredictionResult) -> Self {
        Self {
            glyph: result.metadata.glyph,
            crop: result.crop.clone(),
            category: result.metadata.category,
            season: result.metadata.season,
            water: result.metadata.water,
            listed: result.metadata_source == MetadataSource::Catalog,
        }
    }
}

/// Everything a front-end needs to draw the result area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub submission_id: u64,
    pub status: String,
    pub tone: StatusTone,
    pub card: Option<CropCard>,
    pub placeholder: Option<&'static str>,
    pub error_kind: Option<&'static str>,
    pub busy: bool,
}

pub fn view(snapshot: &StateSnapshot) -> ResultView {
    let mut view = ResultView {
        submission_id: snapshot.submission_id,
        status: String::new(),
        tone: StatusTone::Info,
        card: None,
        placeholder: None,
        error_kind: None,
        busy: false,
    };

    match &snapshot.state {
        SubmissionState::Idle => view.placeholder = Some(IDLE_PLACEHOLDER),
        SubmissionState::Validating | SubmissionState::Pending => {
            view.status = PENDING_STATUS.to_string();
            view.busy = true;
        }
        SubmissionState::Succeeded(result) => view.card = Some(CropCard::from(result)),
        SubmissionState::Failed(err) => {
            view.status = err.to_string();
            view.tone = StatusTone::Error;
            view.error_kind = Some(err.kind());
        }
    }

    view
}

// ==============================================================================
// HTML PAGE
// ==============================================================================

pub fn render_page(snapshot: &StateSnapshot) -> String {
    let view = view(snapshot);

    let mut html = String::from(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>SmartCrop - Crop Recommendation</title>
    <link rel="stylesheet" href="/static/styles.css">
</head>
<body>
    <main class="container">
        <h1>SmartCrop Prediction</h1>
        <form id="predict-form" method="post" action="/submit">
"#,
    );

    for feature in Feature::ALL {
        html.push_str(&render_input(snapshot, feature));
    }

    html.push_str(
        r#"            <button type="submit" class="predict-button">Predict Crop</button>
        </form>
"#,
    );

    let tone = match view.tone {
        StatusTone::Info => "info",
        StatusTone::Error => "error",
    };
    html.push_str(&format!(
        "        <p id=\"status\" class=\"status status-{}\">{}</p>\n",
        tone,
        escape_html(&view.status)
    ));

    html.push_str("        <section id=\"result\">\n");
    html.push_str(&render_result(&view));
    html.push_str("        </section>\n");

    html.push_str(
        r#"    </main>
</body>
</html>
"#,
    );

    html
}

fn render_input(snapshot: &StateSnapshot, feature: Feature) -> String {
    let (min, max) = advisory_range(feature);
    let value = snapshot
        .fields
        .get(feature.key())
        .map(String::as_str)
        .unwrap_or("");
    let class = if outside_advisory(feature, value) {
        "form-group out-of-range"
    } else {
        "form-group"
    };
    // Only ph is a hard bound; other ranges are hints the browser must not enforce.
    let bounds = match feature {
        Feature::Ph => format!("min=\"{min}\" max=\"{max}\""),
        _ => format!("data-min=\"{min}\" data-max=\"{max}\" placeholder=\"{min} - {max}\""),
    };

    format!(
        r#"            <div class="{class}">
                <label for="{key}">{label}</label>
                <input id="{key}" name="{key}" type="number" step="any" {bounds} value="{value}" required>
            </div>
"#,
        class = class,
        key = feature.key(),
        label = escape_html(feature.label()),
        bounds = bounds,
        value = escape_html(value),
    )
}

fn render_result(view: &ResultView) -> String {
    if let Some(card) = &view.card {
        return format!(
            r#"            <div class="success-result">
                <div class="result-icon">{glyph}</div>
                <h3 class="result-title">Recommended Crop</h3>
                <div class="crop-name" id="prediction-value">{crop}</div>
                <div class="crop-info">
                    <p><strong>Category:</strong> {category}</p>
                    <p><strong>Growing Season:</strong> {season}</p>
                    <p><strong>Water Requirement:</strong> {water}</p>
                </div>
{retry}            </div>
"#,
            glyph = card.glyph,
            crop = escape_html(&card.crop),
            category = card.category,
            season = card.season,
            water = card.water,
            retry = retry_form(),
        );
    }

    if view.tone == StatusTone::Error {
        return format!(
            r#"            <div class="error-result">
                <h3 class="error-title">Oops!</h3>
                <p class="error-message">{message}</p>
{retry}            </div>
"#,
            message = escape_html(&view.status),
            retry = retry_form(),
        );
    }

    if view.busy {
        return "            <div class=\"loading-container\"><p>Analyzing soil parameters...</p></div>\n"
            .to_string();
    }

    format!(
        "            <div class=\"placeholder-result\"><p>{}</p></div>\n",
        escape_html(view.placeholder.unwrap_or(IDLE_PLACEHOLDER))
    )
}

fn retry_form() -> &'static str {
    "                <form method=\"post\" action=\"/reset\"><button type=\"submit\" id=\"try-again\" class=\"retry-button\">Try Again</button></form>\n"
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
