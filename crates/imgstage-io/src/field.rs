//! Form field binding.
//!
//! The stager never owns the enclosing form. It is handed a
//! [`FieldBinder`] for its one field and writes the committed key
//! through it; the form runs each field's [`FieldRule`] on submit.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use imgstage_core::ValidationError;

/// One value in an enclosing form.
pub trait FieldBinder {
    /// Current value.
    fn value(&self) -> String;

    /// Replace the value.
    fn on_change(&mut self, value: String);
}

/// A bare string works as a standalone field.
impl FieldBinder for String {
    fn value(&self) -> String {
        self.clone()
    }

    fn on_change(&mut self, value: String) {
        *self = value;
    }
}

/// A validation rule run when the form is submitted.
pub trait FieldRule {
    /// `Ok` if the field may be submitted.
    ///
    /// # Errors
    ///
    /// Returns the reason the field blocks submission.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Named string values making up a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    values: BTreeMap<String, String>,
}

impl Form {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial value.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Value of `name`, if set.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set `name` to `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// A binder for field `name` of a shared form.
    #[must_use]
    pub fn field(form: &Rc<RefCell<Self>>, name: impl Into<String>) -> FormField {
        FormField {
            form: Rc::clone(form),
            name: name.into(),
        }
    }

    /// Run `rules` and hand back the submitted values.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] for the first rule that fails,
    /// in the order given.
    pub fn submit(
        &self,
        rules: &[(&str, &dyn FieldRule)],
    ) -> Result<BTreeMap<String, String>, SubmitError> {
        for (field, rule) in rules {
            rule.validate().map_err(|source| SubmitError::Invalid {
                field: (*field).to_owned(),
                source,
            })?;
        }
        Ok(self.values.clone())
    }
}

/// A field of a shared [`Form`].
#[derive(Debug, Clone)]
pub struct FormField {
    form: Rc<RefCell<Form>>,
    name: String,
}

impl FormField {
    /// Field name within the form.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FieldBinder for FormField {
    fn value(&self) -> String {
        self.form
            .borrow()
            .value(&self.name)
            .unwrap_or_default()
            .to_owned()
    }

    fn on_change(&mut self, value: String) {
        self.form.borrow_mut().set(self.name.clone(), value);
    }
}

/// A form submission was blocked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// A field's rule failed.
    #[error("{field}: {source}")]
    Invalid {
        /// Offending field.
        field: String,
        /// What the rule reported.
        source: ValidationError,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Always(Result<(), ValidationError>);

    impl FieldRule for Always {
        fn validate(&self) -> Result<(), ValidationError> {
            self.0
        }
    }

    #[test]
    fn form_field_writes_through_to_form() {
        let form = Rc::new(RefCell::new(Form::new().with_value("title", "Berlin")));
        let mut field = Form::field(&form, "header_image");
        assert_eq!(field.value(), "");

        field.on_change("abc".into());
        assert_eq!(form.borrow().value("header_image"), Some("abc"));
        assert_eq!(field.value(), "abc");
        assert_eq!(field.name(), "header_image");
    }

    #[test]
    fn submit_reports_failing_field() {
        let form = Form::new().with_value("header_image", "abc");
        let ok = Always(Ok(()));
        let pending = Always(Err(ValidationError::UploadPending));

        let values = form.submit(&[("title", &ok)]).unwrap();
        assert_eq!(values.get("header_image").map(String::as_str), Some("abc"));

        let err = form
            .submit(&[("title", &ok), ("header_image", &pending)])
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Invalid {
                field: "header_image".into(),
                source: ValidationError::UploadPending,
            }
        );
        assert!(err.to_string().starts_with("header_image: "));
    }

    #[test]
    fn string_is_a_binder() {
        let mut value = String::from("orig");
        value.on_change("abc".into());
        assert_eq!(FieldBinder::value(&value), "abc");
    }
}
