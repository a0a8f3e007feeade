use std::borrow::Cow;

use kt_core::session::SessionEvent;
use regex::Regex;

const BANNER: &str = "💬 Interactive debugging session started.\n\
Type 'exit' to quit, 'switch <n>' to jump to a pod, or press Ctrl+N to switch to the next pod.";

// Turns session events into the text the operator sees.  Everything here is presentation only;
// the session keeps the full text of every action result for the reasoning backend.
pub struct Display {
    inline_step: Regex,
    truncate_chars: usize,
}

impl Display {
    pub fn new(truncate_chars: usize) -> anyhow::Result<Display> {
        // A bullet ("- ", "* ", "• ") or numbered ("3. ") step that doesn't start its own line
        let inline_step = Regex::new(r"(\S)[ \t]+([-*•][ \t]+|\d+\.[ \t]+)")?;
        Ok(Display { inline_step, truncate_chars })
    }

    pub fn render(&self, event: &SessionEvent) -> String {
        match event {
            SessionEvent::NamespaceList(namespaces) => {
                let mut out = String::from("\n📁 Available namespaces:\n0. All namespaces");
                for (i, ns) in namespaces.iter().enumerate() {
                    out += &format!("\n{}. {ns}", i + 1);
                }
                out
            },
            SessionEvent::PodList(pods) => {
                let mut out = String::from("\n🚨 Failing pods detected:");
                for (i, pod) in pods.iter().enumerate() {
                    out += &format!("\n{}. {pod}", i + 1);
                }
                out
            },
            SessionEvent::Focused(target) => format!(
                "\n🔄 Focused on pod {} (ns={}, reason={})\n{BANNER}\n",
                target.pod.name, target.pod.namespace, target.unready_reason
            ),
            SessionEvent::ActionRequested(req) => format!("\n🤖 Backend requests action: {req}"),
            SessionEvent::ActionCompleted(res) if res.succeeded => format!(
                "\n📡 Cluster output for {}:\n{}\n",
                res.request.action_type,
                truncate_for_display(&res.output, self.truncate_chars)
            ),
            SessionEvent::ActionCompleted(res) => format!(
                "\n❌ {} failed: {}",
                res.request,
                res.error_detail.as_deref().unwrap_or("unknown error")
            ),
            SessionEvent::ContainerChoice(candidates) => {
                let mut out = String::from("\nMultiple containers detected in pod. Select one:");
                for (i, name) in candidates.iter().enumerate() {
                    out += &format!("\n{}. {name}", i + 1);
                }
                out
            },
            SessionEvent::FinalAnalysis(analysis) => format!(
                "\n✅ Final Analysis:\nRoot Cause: {}\nRemediation:\n{}\n",
                analysis.root_cause,
                self.format_remediation(&analysis.remediation)
            ),
            SessionEvent::Warning(msg) => format!("❌ {msg}"),
            SessionEvent::Notice(msg) => msg.clone(),
        }
    }

    pub fn format_remediation(&self, text: &str) -> String {
        self.inline_step.replace_all(text.trim(), "${1}\n${2}").into_owned()
    }
}

// Cut `text` down to at most `max_chars` characters; 0 means no limit
pub fn truncate_for_display(text: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed(text);
    }

    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let dropped = text[cut..].chars().count();
            Cow::Owned(format!("{}\n... [{dropped} more characters not shown]", &text[..cut]))
        },
    }
}
