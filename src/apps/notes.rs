use serde::Serialize;

/// Free text scratchpad. Lives only as long as its window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotesState {
    pub text: String,
}

impl NotesState {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
