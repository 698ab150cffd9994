use regex::Regex;

use crate::aggregator::{aggregate, BatchTotals};
use crate::types::{LogRecord, ServiceSummary};

/// アプリケーションの入力モードの管理用の列挙型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// ダッシュボード全体の状態を保持する構造体
///
/// フィルタは生ログ一覧の表示だけを絞り込む。集計とグラフは常にバッチ全体。
#[derive(Debug)]
pub struct DashboardState {
    pub records: Vec<LogRecord>,
    pub summaries: Vec<ServiceSummary>,
    pub totals: BatchTotals,
    pub batch_number: u64,
    /// 絞り込み後の一覧におけるインデックス
    pub selected_log_index: Option<usize>,
    pub filter_text: String,
    pub filter_regex: Option<Regex>,
    pub editing_text: String,
    pub input_mode: InputMode,
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(records: Vec<LogRecord>) -> Self {
        let mut state = Self {
            records: Vec::new(),
            summaries: Vec::new(),
            totals: BatchTotals::default(),
            batch_number: 0,
            selected_log_index: None,
            filter_text: String::new(),
            filter_regex: None,
            editing_text: String::new(),
            input_mode: InputMode::Normal,
            status_message: None,
        };
        state.load_batch(records);
        state
    }

    /// 新しいバッチに差し替えて集計し直す（フィルタは維持）
    pub fn load_batch(&mut self, records: Vec<LogRecord>) {
        self.summaries = aggregate(&records);
        self.totals = BatchTotals::from_records(&records);
        self.records = records;
        self.batch_number += 1;
        self.selected_log_index = None;
    }

    fn matches_filter(&self, record: &LogRecord) -> bool {
        match &self.filter_regex {
            Some(regex) => {
                // フィルタリング対象の文字列
                let target_text = format!(
                    "{} {} {}ms {}",
                    record.service(),
                    record.status_code(),
                    record.latency_ms(),
                    record.timestamp_iso()
                );
                regex.is_match(&target_text)
            }
            None => true,
        }
    }

    pub fn visible_records(&self) -> Vec<&LogRecord> {
        self.records
            .iter()
            .filter(|r| self.matches_filter(r))
            .collect()
    }

    pub fn selected_record(&self) -> Option<&LogRecord> {
        let index = self.selected_log_index?;
        self.visible_records().get(index).copied()
    }

    pub fn select_next_log(&mut self) {
        let len = self.visible_records().len();
        if len == 0 {
            return;
        }

        let i = match self.selected_log_index {
            None => 0,
            Some(i) => {
                if i >= len - 1 {
                    len - 1
                } else {
                    i + 1
                }
            }
        };
        self.selected_log_index = Some(i);
    }

    pub fn select_previous_log(&mut self) {
        if self.visible_records().is_empty() {
            return;
        }

        if let Some(i) = self.selected_log_index {
            self.selected_log_index = Some(i.saturating_sub(1));
        }
    }

    pub fn unselect_log(&mut self) {
        self.selected_log_index = None;
    }

    /// 空文字列でフィルタ解除。不正な正規表現の場合も解除してメッセージを残す
    pub fn set_filter(&mut self, text: String) {
        self.selected_log_index = None;
        if text.is_empty() {
            self.filter_text = text;
            self.filter_regex = None;
            return;
        }

        match Regex::new(&text) {
            Ok(re) => {
                self.filter_text = text;
                self.filter_regex = Some(re);
            }
            Err(e) => {
                self.set_status(format!("Invalid filter '{text}': {e}"));
                self.filter_text.clear();
                self.filter_regex = None;
            }
        }
    }

    pub fn start_editing(&mut self) {
        self.editing_text = self.filter_text.clone();
        self.input_mode = InputMode::Editing;
    }

    pub fn push_editing_char(&mut self, c: char) {
        self.editing_text.push(c);
    }

    pub fn pop_editing_char(&mut self) {
        self.editing_text.pop();
    }

    pub fn submit_editing(&mut self) {
        let text = std::mem::take(&mut self.editing_text);
        self.set_filter(text);
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_editing(&mut self) {
        self.editing_text.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }
}
