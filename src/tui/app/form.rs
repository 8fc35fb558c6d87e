//! Node create/edit form
//!
//! Backs the New and Edit dialogs. The form only checks required fields and
//! the port range; everything else is left to the API.

use crate::models::{Node, NodeDraft};

/// Form fields in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Port,
    User,
    Password,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Port,
        FormField::User,
        FormField::Password,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Host name",
            FormField::Port => "Port",
            FormField::User => "User",
            FormField::Password => "Password",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Whether the form creates a node or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit { original_name: String },
}

/// A submitted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(NodeDraft),
    Update { name: String, draft: NodeDraft },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeForm {
    pub mode: FormMode,
    pub name: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub focused: FormField,
    /// Validation or save error shown inside the dialog
    pub error: Option<String>,
    /// Id of the save request in flight, if any
    pub pending_save: Option<u64>,
}

impl NodeForm {
    /// Empty form for a new node (port defaults to 22)
    #[must_use]
    pub fn new_node() -> Self {
        Self {
            mode: FormMode::New,
            name: String::new(),
            port: "22".to_string(),
            user: String::new(),
            password: String::new(),
            focused: FormField::Name,
            error: None,
            pending_save: None,
        }
    }

    /// Form pre-filled from an existing node. The password is left blank.
    #[must_use]
    pub fn edit_node(node: &Node) -> Self {
        Self {
            mode: FormMode::Edit {
                original_name: node.name.clone(),
            },
            name: node.name.clone(),
            port: node.port.map(|p| p.to_string()).unwrap_or_default(),
            user: node.user.clone().unwrap_or_default(),
            password: String::new(),
            focused: FormField::Port,
            error: None,
            pending_save: None,
        }
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.is_edit() { " Edit node " } else { " New node " }
    }

    /// The host name is the identity key and cannot change on edit
    #[must_use]
    pub fn is_read_only(&self, field: FormField) -> bool {
        field == FormField::Name && self.is_edit()
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Port => &self.port,
            FormField::User => &self.user,
            FormField::Password => &self.password,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Port => &mut self.port,
            FormField::User => &mut self.user,
            FormField::Password => &mut self.password,
        }
    }

    pub fn focus_next(&mut self) {
        let next = (self.focused.index() + 1) % FormField::ALL.len();
        self.focused = FormField::ALL[next];
        if self.is_read_only(self.focused) {
            self.focus_next();
        }
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focused.index() + len - 1) % len;
        self.focused = FormField::ALL[prev];
        if self.is_read_only(self.focused) {
            self.focus_prev();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_saving() || self.is_read_only(self.focused) {
            return;
        }
        if self.focused == FormField::Port && !c.is_ascii_digit() {
            return;
        }
        self.value_mut(self.focused).push(c);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if self.is_saving() || self.is_read_only(self.focused) {
            return;
        }
        self.value_mut(self.focused).pop();
        self.error = None;
    }

    pub fn clear_field(&mut self) {
        if self.is_saving() || self.is_read_only(self.focused) {
            return;
        }
        self.value_mut(self.focused).clear();
    }

    /// Check the fields and build the request
    pub fn submission(&self) -> Result<Submission, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Host name is required".to_string());
        }

        let port = match self.port.trim().parse::<u16>() {
            Ok(0) | Err(_) => return Err("Port must be a number between 1 and 65535".to_string()),
            Ok(port) => port,
        };

        let user = self.user.trim();
        if user.is_empty() {
            return Err("User is required".to_string());
        }

        let password = if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        };

        let draft = NodeDraft {
            name: name.to_string(),
            port,
            user: user.to_string(),
            password,
        };

        match &self.mode {
            FormMode::New => {
                if draft.password.is_none() {
                    return Err("Password is required".to_string());
                }
                Ok(Submission::Create(draft))
            }
            FormMode::Edit { original_name } => Ok(Submission::Update {
                name: original_name.clone(),
                draft,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut NodeForm, s: &str) {
        for c in s.chars() {
            form.insert_char(c);
        }
    }

    fn filled_new_form() -> NodeForm {
        let mut form = NodeForm::new_node();
        type_str(&mut form, "node01");
        form.focused = FormField::User;
        type_str(&mut form, "ohara");
        form.focused = FormField::Password;
        type_str(&mut form, "secret");
        form
    }

    #[test]
    fn test_new_form_submission() {
        let form = filled_new_form();
        assert_eq!(
            form.submission(),
            Ok(Submission::Create(NodeDraft {
                name: "node01".to_string(),
                port: 22,
                user: "ohara".to_string(),
                password: Some("secret".to_string()),
            }))
        );
    }

    #[test]
    fn test_new_form_requires_password() {
        let mut form = filled_new_form();
        form.password.clear();
        assert_eq!(form.submission(), Err("Password is required".to_string()));
    }

    #[test]
    fn test_port_rejects_non_digits_and_zero() {
        let mut form = filled_new_form();
        form.focused = FormField::Port;
        form.clear_field();
        type_str(&mut form, "2a2");
        assert_eq!(form.port, "22");

        form.clear_field();
        form.insert_char('0');
        assert!(form.submission().unwrap_err().contains("Port"));

        form.clear_field();
        type_str(&mut form, "70000");
        assert!(form.submission().is_err());
    }

    #[test]
    fn test_required_fields() {
        let form = NodeForm::new_node();
        assert_eq!(form.submission(), Err("Host name is required".to_string()));

        let mut form = filled_new_form();
        form.user = "   ".to_string();
        assert_eq!(form.submission(), Err("User is required".to_string()));
    }

    #[test]
    fn test_edit_form_prefill_and_update() {
        let mut node = Node::named("node02");
        node.user = Some("admin".to_string());
        node.port = Some(2222);
        node.password = Some("old".to_string());

        let form = NodeForm::edit_node(&node);
        assert_eq!(form.port, "2222");
        assert_eq!(form.user, "admin");
        assert!(form.password.is_empty());
        assert_eq!(
            form.submission(),
            Ok(Submission::Update {
                name: "node02".to_string(),
                draft: NodeDraft {
                    name: "node02".to_string(),
                    port: 2222,
                    user: "admin".to_string(),
                    password: None,
                },
            })
        );
    }

    #[test]
    fn test_edit_form_name_read_only() {
        let mut form = NodeForm::edit_node(&Node::named("node02"));
        form.focused = FormField::Name;
        form.insert_char('x');
        form.backspace();
        assert_eq!(form.name, "node02");
    }

    #[test]
    fn test_focus_cycle_skips_read_only() {
        let mut form = NodeForm::edit_node(&Node::named("n"));
        assert_eq!(form.focused, FormField::Port);
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focused, FormField::Password);
        form.focus_next();
        assert_eq!(form.focused, FormField::Port);
        form.focus_prev();
        assert_eq!(form.focused, FormField::Password);

        let mut form = NodeForm::new_node();
        form.focus_prev();
        assert_eq!(form.focused, FormField::Password);
    }

    #[test]
    fn test_saving_blocks_edits() {
        let mut form = NodeForm::new_node();
        form.pending_save = Some(1);
        form.insert_char('a');
        assert!(form.name.is_empty());
    }
}
