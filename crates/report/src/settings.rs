//! Branding, URLs and file naming for rendered reports

use crate::layout::ReportLayout;
use crate::qr::QrCodeRasterizer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Printed in every footer and stored as the PDF creator
    pub product_label: String,
    pub report_title: String,
    /// Base of the questionnaire page used for posters without a link
    pub questionnaire_base_url: String,
    /// `{event_id}` is replaced by the event id or `filename_fallback`
    pub filename_template: String,
    pub filename_fallback: String,
    pub compress: bool,
    pub qr: QrCodeRasterizer,
    pub layout: ReportLayout,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            product_label: "EventRate Pro".to_string(),
            report_title: "Event Export Report".to_string(),
            questionnaire_base_url: "https://event-rate-pro.vercel.app".to_string(),
            filename_template: "EventRate-Pro-Export-{event_id}.pdf".to_string(),
            filename_fallback: "report".to_string(),
            compress: true,
            qr: QrCodeRasterizer::default(),
            layout: ReportLayout::default(),
        }
    }
}

impl ReportSettings {
    pub fn filename(&self, event_id: Option<&str>) -> String {
        render_filename(&self.filename_template, event_id, &self.filename_fallback)
    }
}

/// Fill `{event_id}` in a filename template
///
/// Path separators in the id are replaced so the result stays a single
/// file name.
pub fn render_filename(template: &str, event_id: Option<&str>, fallback: &str) -> String {
    let id = event_id.map(str::trim).filter(|id| !id.is_empty()).unwrap_or(fallback);
    let id: String = id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    template.replace("{event_id}", &id)
}
