//! Editor dialog state

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Create,
    Edit,
}

/// Visibility, mode and edit buffer of one editor dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor<F> {
    pub visible: bool,
    pub mode: EditorMode,
    pub form: F,
}

impl<F> Editor<F> {
    pub fn open(mode: EditorMode, form: F) -> Self {
        Self {
            visible: true,
            mode,
            form,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.mode == EditorMode::Edit
    }

    /// Dialog title such as "Create user" or "Edit role"
    pub fn title(&self, resource: &str) -> String {
        match self.mode {
            EditorMode::Create => format!("Create {}", resource),
            EditorMode::Edit => format!("Edit {}", resource),
        }
    }
}
