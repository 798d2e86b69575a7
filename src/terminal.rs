// src/terminal.rs
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::flow::{Button, Prompt, UiEvent, UiHost};

// =============================================================================
// COMMANDS
// =============================================================================
pub const CMD_BACK: &str = ":back";
pub const CMD_SKIP: &str = ":skip";
pub const CMD_CLEAR: &str = ":clear";
pub const CMD_QUIT: &str = ":q";

/// Line-based prompts on stderr, answers from `R` (stdin by default). Each
/// submitted line of a text prompt is reported as a change followed by an
/// accept. Stdout stays free for the final message.
pub struct TerminalHost<R = BufReader<Stdin>> {
    lines: Lines<R>,
    queue: VecDeque<UiEvent>,
    current: Option<Prompt>,
    value: String,
    prompted: bool,
    /// An accept was handed out and its validation has not answered yet.
    accepting: bool,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> TerminalHost<R> {
    pub fn with_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            queue: VecDeque::new(),
            current: None,
            value: String::new(),
            prompted: false,
            accepting: false,
        }
    }

    fn print_prompt(&mut self) {
        if !self.prompted {
            eprint!("> ");
            io::stderr().flush().ok();
            self.prompted = true;
        }
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RENDERING
// =============================================================================
pub fn render(prompt: &Prompt) -> String {
    let info = prompt.info();
    let mut out = format!("\n[{}/{}] {}\n", info.step, info.total_steps, info.title);

    match prompt {
        Prompt::Pick(pick) => {
            if let Some(p) = &pick.placeholder {
                out.push_str(&format!("  {}\n", p));
            }
            for (i, item) in pick.items.iter().enumerate() {
                let marker = if pick.active == Some(i) { '*' } else { ' ' };
                match &item.detail {
                    Some(detail) => out.push_str(&format!("{} {:>2}) {:<10} {}\n", marker, i + 1, item.label, detail)),
                    None => out.push_str(&format!("{} {:>2}) {}\n", marker, i + 1, item.label)),
                }
            }
        }
        Prompt::Input(input) => {
            if let Some(p) = &input.placeholder {
                out.push_str(&format!("  {}\n", p));
            }
            if !input.value.is_empty() {
                out.push_str(&format!("  [current: {}]  (Enter keeps it, {} empties it)\n", input.value, CMD_CLEAR));
            }
        }
    }

    let mut hints: Vec<String> = prompt
        .buttons()
        .iter()
        .map(|b| match b {
            Button::Back => format!("{} {}", CMD_BACK, b.tooltip().to_lowercase()),
            Button::Skip => format!("{} {}", CMD_SKIP, b.tooltip().to_lowercase()),
        })
        .collect();
    hints.push(format!("{} quit", CMD_QUIT));
    out.push_str(&format!("  ({})\n", hints.join(", ")));
    out
}

/// Turn one line of input into events for `prompt`. `value` is the text
/// currently held by an input prompt. An empty result means the line was
/// not understood. A blank answer to a pick with nothing highlighted is the
/// terminal's way of looking away: it dismisses the prompt unless
/// `ignore_focus_out` is set.
pub fn translate(prompt: &Prompt, value: &mut String, line: &str) -> Vec<UiEvent> {
    let trimmed = line.trim();
    let buttons = prompt.buttons();

    if trimmed == CMD_QUIT {
        return vec![UiEvent::Hidden];
    }
    if trimmed == CMD_BACK && buttons.contains(&Button::Back) {
        return vec![UiEvent::Triggered(Button::Back)];
    }
    if trimmed == CMD_SKIP && buttons.contains(&Button::Skip) {
        return vec![UiEvent::Triggered(Button::Skip)];
    }

    match prompt {
        Prompt::Pick(pick) => {
            if trimmed.is_empty() {
                return match pick.active {
                    Some(index) => vec![UiEvent::Selected(index)],
                    None if !pick.info.ignore_focus_out => vec![UiEvent::Hidden],
                    None => Vec::new(),
                };
            }
            if let Ok(n) = trimmed.parse::<usize>() {
                return (1..=pick.items.len())
                    .contains(&n)
                    .then(|| UiEvent::Selected(n - 1))
                    .into_iter()
                    .collect();
            }
            pick.items
                .iter()
                .position(|item| item.label.eq_ignore_ascii_case(trimmed))
                .map(UiEvent::Selected)
                .into_iter()
                .collect()
        }
        Prompt::Input(_) => {
            if trimmed == CMD_CLEAR {
                value.clear();
            } else if !trimmed.is_empty() {
                *value = trimmed.to_string();
            }
            vec![UiEvent::Changed(value.clone()), UiEvent::Accepted]
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> UiHost for TerminalHost<R> {
    fn show(&mut self, prompt: &Prompt) {
        eprint!("{}", render(prompt));
        self.value = match prompt {
            Prompt::Input(input) => input.value.clone(),
            Prompt::Pick(_) => String::new(),
        };
        self.current = Some(prompt.clone());
        self.queue.clear();
        self.prompted = false;
        self.accepting = false;
    }

    fn hide(&mut self) {
        self.current = None;
        self.queue.clear();
        self.accepting = false;
    }

    // The controller also marks the old prompt busy between steps; only a
    // pending accept is worth a line.
    fn set_busy(&mut self, busy: bool) {
        if !busy {
            self.accepting = false;
        } else if self.accepting && self.current.is_some() {
            eprintln!("  checking...");
            self.prompted = false;
        }
    }

    fn set_validation_message(&mut self, message: Option<&str>) {
        if let Some(m) = message {
            eprintln!("  ! {}", m);
        }
        self.prompted = false;
    }

    async fn next_event(&mut self) -> UiEvent {
        loop {
            if let Some(event) = self.queue.pop_front() {
                if event == UiEvent::Accepted {
                    self.accepting = true;
                }
                return event;
            }
            let Some(prompt) = self.current.clone() else {
                return UiEvent::Hidden;
            };

            self.print_prompt();
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => return UiEvent::Hidden,
            };
            self.prompted = false;

            let events = translate(&prompt, &mut self.value, &line);
            if events.is_empty() {
                eprintln!("  ? unknown choice: {}", line.trim());
            }
            self.queue.extend(events);
        }
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Commitrc;
    use crate::flow::{FlowOutcome, InputPrompt, PickItem, PickPrompt, StepInfo};
    use crate::steps::collect;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn info(step: usize) -> StepInfo {
        StepInfo {
            title: "Commit type".into(),
            step,
            total_steps: 5,
            ignore_focus_out: true,
        }
    }

    fn pick(active: Option<usize>) -> Prompt {
        Prompt::Pick(PickPrompt {
            info: info(1),
            placeholder: None,
            items: vec![
                PickItem { label: "feat".into(), detail: Some("A new feature".into()) },
                PickItem { label: "fix".into(), detail: None },
            ],
            active,
            buttons: vec![],
        })
    }

    fn input(buttons: Vec<Button>) -> Prompt {
        Prompt::Input(InputPrompt {
            info: info(4),
            placeholder: Some("Body".into()),
            value: "old".into(),
            buttons,
        })
    }

    #[test]
    fn pick_accepts_number_and_label() {
        let mut v = String::new();
        assert_eq!(translate(&pick(None), &mut v, "2"), vec![UiEvent::Selected(1)]);
        assert_eq!(translate(&pick(None), &mut v, "FEAT"), vec![UiEvent::Selected(0)]);
        assert!(translate(&pick(None), &mut v, "9").is_empty());
        assert!(translate(&pick(None), &mut v, "nope").is_empty());
    }

    #[test]
    fn pick_enter_keeps_active_item() {
        let mut v = String::new();
        assert_eq!(translate(&pick(Some(1)), &mut v, ""), vec![UiEvent::Selected(1)]);
        assert!(translate(&pick(None), &mut v, "").is_empty());
    }

    #[test]
    fn back_only_when_offered() {
        let mut v = String::new();
        assert_eq!(
            translate(&input(vec![Button::Back]), &mut v, ":back"),
            vec![UiEvent::Triggered(Button::Back)]
        );
        let events = translate(&input(vec![]), &mut v, ":back");
        assert_eq!(events, vec![UiEvent::Changed(":back".into()), UiEvent::Accepted]);
    }

    #[test]
    fn input_line_changes_then_accepts() {
        let mut v = "old".to_string();
        let events = translate(&input(vec![Button::Skip]), &mut v, "new text");
        assert_eq!(events, vec![UiEvent::Changed("new text".into()), UiEvent::Accepted]);
        assert_eq!(v, "new text");
    }

    #[test]
    fn input_enter_keeps_and_clear_empties() {
        let mut v = "old".to_string();
        assert_eq!(translate(&input(vec![]), &mut v, "")[0], UiEvent::Changed("old".into()));
        assert_eq!(translate(&input(vec![]), &mut v, ":clear")[0], UiEvent::Changed(String::new()));
    }

    #[test]
    fn quit_hides_anywhere() {
        let mut v = String::new();
        assert_eq!(translate(&pick(None), &mut v, ":q"), vec![UiEvent::Hidden]);
        assert_eq!(translate(&input(vec![]), &mut v, " :q "), vec![UiEvent::Hidden]);
    }

    #[test]
    fn render_marks_active_and_lists_buttons() {
        let out = render(&pick(Some(0)));
        assert!(out.contains("[1/5] Commit type"));
        assert!(out.contains("*  1) feat"));
        let out = render(&input(vec![Button::Back, Button::Skip]));
        assert!(out.contains("[current: old]"));
        assert!(out.contains(":back back, :skip skip, :q quit"));
    }

    #[test]
    fn blank_pick_dismisses_unless_focus_out_ignored() {
        let mut v = String::new();
        let mut prompt = pick(None);
        if let Prompt::Pick(p) = &mut prompt {
            p.info.ignore_focus_out = false;
        }
        assert_eq!(translate(&prompt, &mut v, "  "), vec![UiEvent::Hidden]);
        assert!(translate(&pick(None), &mut v, "").is_empty());
    }

    fn host(input: &'static str) -> TerminalHost<&'static [u8]> {
        TerminalHost::with_reader(input.as_bytes())
    }

    #[tokio::test]
    async fn host_picks_by_label() {
        let mut h = host("feat\n");
        h.show(&pick(None));
        assert_eq!(h.next_event().await, UiEvent::Selected(0));
    }

    #[tokio::test]
    async fn host_reports_change_then_accept() {
        let mut h = host("text\n");
        h.show(&input(vec![]));
        assert_eq!(h.next_event().await, UiEvent::Changed("text".into()));
        assert_eq!(h.next_event().await, UiEvent::Accepted);
    }

    #[tokio::test]
    async fn host_skips_unknown_lines() {
        let mut h = host("nope\n2\n");
        h.show(&pick(None));
        assert_eq!(h.next_event().await, UiEvent::Selected(1));
    }

    #[tokio::test]
    async fn host_eof_is_hidden() {
        let mut h = host("");
        h.show(&pick(None));
        assert_eq!(h.next_event().await, UiEvent::Hidden);
    }

    #[tokio::test]
    async fn host_hidden_after_hide() {
        let mut h = host("feat\n");
        h.show(&pick(None));
        h.hide();
        assert_eq!(h.next_event().await, UiEvent::Hidden);
    }

    #[tokio::test]
    async fn host_busy_only_while_accept_pending() {
        let mut h = host("text\n");
        h.show(&input(vec![]));
        h.set_busy(true);
        assert!(!h.accepting);

        h.next_event().await;
        assert_eq!(h.next_event().await, UiEvent::Accepted);
        assert!(h.accepting);
        h.set_busy(false);
        assert!(!h.accepting);
    }

    #[tokio::test]
    async fn host_resumes_after_dropped_wait() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut h = TerminalHost::with_reader(BufReader::new(rx));
        h.show(&pick(None));

        let waited = tokio::time::timeout(Duration::from_millis(10), h.next_event()).await;
        assert!(waited.is_err());
        // The prompt marker is still on screen and not printed twice.
        assert!(h.prompted);

        tx.write_all(b"2\n").await.unwrap();
        assert_eq!(h.next_event().await, UiEvent::Selected(1));
    }

    #[tokio::test]
    async fn eof_mid_flow_cancels() {
        let config = Commitrc::default();
        let mut h = host("feat\n");

        match collect(&config, Duration::ZERO, &mut h, None).await.unwrap() {
            FlowOutcome::Canceled(state) => {
                assert_eq!(state.commit_type.map(|t| t.label), Some("feat".to_string()));
                assert_eq!(state.scope, None);
            }
            FlowOutcome::Completed(_) => panic!("Expected a canceled flow"),
        }
    }
}
