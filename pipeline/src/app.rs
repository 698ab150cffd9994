use std::io::{Write, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::aggregator::aggregate;
use crate::config::{Mode, PipelineConfig};
use crate::generator::LogGenerator;
use crate::report;
use crate::state::{DashboardState, InputMode};
use crate::tui::{self, Tui};

const TICK_RATE: u64 = 100;

/// キー入力の結果としてループ側で行う処理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Regenerate,
    Copy,
}

pub fn run(config: &PipelineConfig) -> Result<()> {
    match config.mode {
        Mode::Report => run_pipeline(config, &mut stdout().lock()),
        Mode::Dashboard => run_dashboard(config),
    }
}

/// 生成 → 集計 → レポート出力
pub fn run_pipeline<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<()> {
    let mut generator = LogGenerator::seeded(config.seed, config.generator.clone())?;
    let records = generator.simulate(config.count)?;

    let summaries = aggregate(&records);
    info!(
        records = records.len(),
        services = summaries.len(),
        "Aggregated batch"
    );

    report::write_report(out, &records, &summaries, config.preview)
        .context("failed to write report")
}

pub fn run_dashboard(config: &PipelineConfig) -> Result<()> {
    let mut generator = LogGenerator::seeded(config.seed, config.generator.clone())?;
    let records = generator.simulate(config.count)?;
    let mut state = DashboardState::new(records);

    // TUIの初期化
    let mut terminal = tui::init()?;

    let app_result = event_loop(&mut terminal, &mut state, &mut generator, config.count);

    // TUIの終了処理（ループがエラーでも必ず戻す）
    tui::restore()?;

    app_result
}

fn event_loop<R: Rng>(
    terminal: &mut Tui,
    state: &mut DashboardState,
    generator: &mut LogGenerator<R>,
    count: i64,
) -> Result<()> {
    loop {
        terminal.draw(|f| tui::ui(f, state))?;

        if !event::poll(Duration::from_millis(TICK_RATE))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        match handle_key(state, key) {
            KeyAction::Quit => break,
            KeyAction::Regenerate => {
                let records = generator.simulate(count)?;
                state.load_batch(records);
                debug!(batch = state.batch_number, "Regenerated batch");
                let message = format!("Regenerated batch #{}", state.batch_number);
                state.set_status(message);
            }
            KeyAction::Copy => copy_selected(state),
            KeyAction::None => {}
        }
    }
    Ok(())
}

/// 状態を直接変更し、ループ側の処理が必要なら KeyAction で返す
pub fn handle_key(state: &mut DashboardState, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }

    // rawモードでは Ctrl+C がシグナルにならないので自前で終了
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    match state.input_mode {
        InputMode::Editing => {
            match key.code {
                KeyCode::Enter => state.submit_editing(),
                KeyCode::Esc => state.cancel_editing(),
                KeyCode::Backspace => state.pop_editing_char(),
                KeyCode::Char(c) => state.push_editing_char(c),
                _ => {}
            }
            KeyAction::None
        }
        InputMode::Normal => match key.code {
            // 終了
            KeyCode::Char('q') => KeyAction::Quit,
            // 上へスクロール
            KeyCode::Up | KeyCode::Char('k') => {
                state.select_previous_log();
                KeyAction::None
            }
            // 下へスクロール
            KeyCode::Down | KeyCode::Char('j') => {
                state.select_next_log();
                KeyAction::None
            }
            // 選択解除
            KeyCode::Esc => {
                state.unselect_log();
                KeyAction::None
            }
            KeyCode::Char('/') => {
                state.start_editing();
                KeyAction::None
            }
            KeyCode::Char('c') => KeyAction::Copy,
            KeyCode::Char('r') => KeyAction::Regenerate,
            _ => KeyAction::None,
        },
    }
}

fn copy_selected(state: &mut DashboardState) {
    let Some(record) = state.selected_record() else {
        state.set_status("Select a record first (j/k)");
        return;
    };

    let result = serde_json::to_string(record)
        .map_err(anyhow::Error::from)
        .and_then(|json| copy_to_clipboard(&mut stdout(), &json));

    match result {
        Ok(()) => state.set_status("Copied record to clipboard"),
        Err(e) => {
            warn!(error = %e, "Failed to copy to clipboard");
            state.set_status(format!("Failed to copy to clipboard: {e}"));
        }
    }
}

/// OSC 52 エスケープシーケンスでクリップボードへ送る
///
/// `\x1b]52;c;{Base64文字列}\x07` をターミナルが解釈してクリップボードに設定する。
fn copy_to_clipboard<W: Write>(out: &mut W, text: &str) -> Result<()> {
    let encoded = general_purpose::STANDARD.encode(text);
    write!(out, "\x1b]52;c;{}\x07", encoded)?;
    out.flush()?;
    Ok(())
}
