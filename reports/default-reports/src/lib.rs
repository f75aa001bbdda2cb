use common::report::Report;

/// Names accepted by `type:` in the `reports` list
pub const REPORT_NAMES: &[&str] = &["CoordinatePlot", "RawData", "TextTable", "MarkupTable"];

/// Touches every emitter so the linker keeps their `typetag` registrations.
/// Call once before deserializing a config.
pub fn init_reports() {
    let reports: [Box<dyn Report>; 4] = [
        Box::new(pgfplots::CoordinatePlot::default()),
        Box::new(raw_data::RawData::default()),
        Box::new(tables::TextTable::default()),
        Box::new(tables::MarkupTable::default()),
    ];
    for report in &reports {
        _ = serde_json::to_string(report);
    }
}
