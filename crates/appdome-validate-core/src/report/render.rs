use crate::TOOL_NAME;
use crate::report::model::RunReport;

pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    for artifact in &report.artifacts {
        out.push_str(&format!(
            "Artifact: {} ({} bytes, {} {})\n",
            artifact.path, artifact.size_bytes, artifact.hash.algorithm, artifact.hash.value
        ));
        if let Some(url) = &artifact.source_url {
            out.push_str(&format!("  downloaded from {url}\n"));
        }
    }
    if let Some(invocation) = &report.invocation {
        out.push_str(&format!("Command: {}\n", invocation.argv.join(" ")));
        match &invocation.output_path {
            Some(path) => out.push_str(&format!("Results: {path}\n")),
            None => out.push_str("Results: not saved\n"),
        }
    }
    if !report.notices.is_empty() {
        out.push_str("Notices:\n");
        for notice in &report.notices {
            out.push_str(&format!("  - [{:?}] {}\n", notice.level, notice.message));
        }
    }
    if let Some(error) = &report.error {
        out.push_str(&format!("Error: {error}\n"));
    }
    out.push_str(&format!(
        "Outcome: {} ({})\n",
        report.classification.outcome, report.classification.reason
    ));
    out
}
