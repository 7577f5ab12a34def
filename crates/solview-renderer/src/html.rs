//! HTML backend for view models.
//!
//! Produces semantic HTML5 fragments. All text is escaped except engine
//! markup, which is inserted as-is.

use std::fmt::Write;

use solview_diagrams::FlowStep;
use solview_extract::CodeSnippet;

use crate::view::{ApproachView, DiagramView, SolutionView, ViewModel};

/// Render a view model to an HTML fragment.
#[must_use]
pub fn render_html(view: &ViewModel) -> String {
    let mut out = String::new();
    match view {
        ViewModel::Error {
            message,
            raw_response,
        } => error_card(message, raw_response.as_deref(), &mut out),
        ViewModel::Solution(solution) => solution_html(solution, &mut out),
    }
    out
}

fn error_card(message: &str, raw_response: Option<&str>, out: &mut String) {
    write!(
        out,
        r#"<div class="card error"><h3>Error Processing Solution</h3><p>{}</p>"#,
        escape_html(message)
    )
    .unwrap();
    if let Some(raw) = raw_response {
        write!(
            out,
            "<details><summary>Raw Response</summary><pre>{}</pre></details>",
            escape_html(raw)
        )
        .unwrap();
    }
    out.push_str("</div>");
}

fn solution_html(solution: &SolutionView, out: &mut String) {
    out.push_str(r#"<div class="solution-container">"#);

    write!(
        out,
        r#"<section class="card solution-section explanation"><h2>Problem Explanation</h2><p>{}</p></section>"#,
        escape_html(&solution.explanation)
    )
    .unwrap();

    if !solution.approaches.is_empty() {
        out.push_str(
            r#"<section class="card solution-section"><h2>Solution Approaches</h2><div class="approaches-grid">"#,
        );
        for approach in &solution.approaches {
            approach_card(approach, out);
        }
        out.push_str("</div></section>");
    }

    out.push_str(
        r#"<section class="card solution-section"><h2>Solution Flowchart</h2><div class="flowchart-container">"#,
    );
    diagram_html(&solution.diagram, out);
    out.push_str("</div></section>");

    if solution.key_insights.is_some() || solution.related_concepts.is_some() {
        out.push_str(
            r#"<section class="card solution-section"><h2>Additional Information</h2><div class="insights-grid">"#,
        );
        if let Some(insights) = &solution.key_insights {
            titled_list("key-insights", "Key Insights", insights, out);
        }
        if let Some(concepts) = &solution.related_concepts {
            titled_list("related-concepts", "Related Concepts", concepts, out);
        }
        out.push_str("</div></section>");
    }

    out.push_str("</div>");
}

fn approach_card(approach: &ApproachView, out: &mut String) {
    write!(
        out,
        r#"<article class="approach-card"><div class="approach-header"><h3>{}</h3><span class="approach-complexity">{}</span></div><div class="approach-content"><p class="approach-description">{}</p>"#,
        escape_html(&approach.name),
        escape_html(&approach.complexity),
        escape_html(&approach.description)
    )
    .unwrap();

    if approach.pros.is_some() || approach.cons.is_some() {
        out.push_str(r#"<div class="pros-cons">"#);
        if let Some(pros) = &approach.pros {
            titled_list("pros", "Pros", pros, out);
        }
        if let Some(cons) = &approach.cons {
            titled_list("cons", "Cons", cons, out);
        }
        out.push_str("</div>");
    }

    if let Some(code) = &approach.code {
        code_block(code, out);
    }

    out.push_str("</div></article>");
}

fn code_block(code: &CodeSnippet, out: &mut String) {
    write!(
        out,
        r#"<div class="code-block"><div class="code-language">{}</div><pre><code class="language-{}">{}</code></pre></div>"#,
        escape_html(&code.language.to_uppercase()),
        escape_html(&code.language),
        escape_html(&code.body)
    )
    .unwrap();
}

fn titled_list(class: &str, title: &str, items: &[String], out: &mut String) {
    write!(out, r#"<div class="{class}"><h4>{title}</h4><ul>"#).unwrap();
    for item in items {
        write!(out, "<li>{}</li>", escape_html(item)).unwrap();
    }
    out.push_str("</ul></div>");
}

fn diagram_html(diagram: &DiagramView, out: &mut String) {
    match diagram {
        DiagramView::Steps { steps } => step_list(steps, out),
        DiagramView::RawSource { source } => {
            write!(
                out,
                r#"<div class="flowchart-raw"><p>Flowchart structure (Mermaid format):</p><pre>{}</pre></div>"#,
                escape_html(source)
            )
            .unwrap();
        }
        DiagramView::Rendered { markup, .. } => out.push_str(markup),
        DiagramView::Failed { reason, source } => {
            write!(
                out,
                r#"<div class="flowchart-error"><p><strong>Flowchart Preview Unavailable</strong></p><p>{}</p><details><summary>View Mermaid Code</summary><pre>{}</pre></details></div>"#,
                escape_html(reason),
                escape_html(source)
            )
            .unwrap();
        }
        DiagramView::Absent => {
            out.push_str(
                r#"<p class="flowchart-empty">No flowchart available for this solution</p>"#,
            );
        }
    }
}

fn step_list(steps: &[FlowStep], out: &mut String) {
    out.push_str(r#"<ol class="flowchart-steps">"#);
    for (index, step) in steps.iter().enumerate() {
        write!(
            out,
            r#"<li class="step step-{}" data-step-id="{}">{}</li>"#,
            step.kind.as_str(),
            escape_html(&step.id),
            escape_html(&step.label)
        )
        .unwrap();
        if index + 1 < steps.len() {
            out.push_str(r#"<li class="step-connector" aria-hidden="true"></li>"#);
        }
    }
    out.push_str("</ol>");
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
