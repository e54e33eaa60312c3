//! Typed field extraction over an element, with errors naming the document.

use chrono::{DateTime, Utc};
use reelforge_common::time::parse_issue_date;
use reelforge_common::AssetId;
use reelforge_xml::Element;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::FieldError;

/// Field reader for the children of one element.
#[derive(Clone, Copy)]
pub(crate) struct Fields<'a> {
    element: &'a Element,
    ns: Option<&'a str>,
    path: &'a Path,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(element: &'a Element, ns: Option<&'a str>, path: &'a Path) -> Self {
        Self { element, ns, path }
    }

    /// Same namespace and document, different element.
    pub(crate) fn on(&self, element: &'a Element) -> Self {
        Self { element, ..*self }
    }

    pub(crate) fn element(&self) -> &'a Element {
        self.element
    }

    pub(crate) fn path(&self) -> &'a Path {
        self.path
    }

    pub(crate) fn text(&self, name: &str) -> Option<&'a str> {
        self.element.child_text(name, self.ns)
    }

    pub(crate) fn owned_text(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    pub(crate) fn required(&self, name: &str) -> Result<&'a str, FieldError> {
        self.text(name).ok_or_else(|| self.missing(name))
    }

    pub(crate) fn required_child(&self, name: &str) -> Result<&'a Element, FieldError> {
        self.element
            .child(name, self.ns)
            .ok_or_else(|| self.missing(name))
    }

    pub(crate) fn id(&self, name: &str) -> Result<AssetId, FieldError> {
        let value = self.required(name)?;
        AssetId::from_urn(value).map_err(|e| self.invalid(name, value, e))
    }

    pub(crate) fn optional_id(&self, name: &str) -> Result<Option<AssetId>, FieldError> {
        self.text(name)
            .map(|value| AssetId::from_urn(value).map_err(|e| self.invalid(name, value, e)))
            .transpose()
    }

    pub(crate) fn date(&self, name: &str) -> Result<DateTime<Utc>, FieldError> {
        let value = self.required(name)?;
        parse_issue_date(value).map_err(|e| self.invalid(name, value, e))
    }

    pub(crate) fn optional_date(&self, name: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        self.text(name)
            .map(|value| parse_issue_date(value).map_err(|e| self.invalid(name, value, e)))
            .transpose()
    }

    pub(crate) fn parse<T>(&self, name: &str) -> Result<T, FieldError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.required(name)?;
        value.parse().map_err(|e| self.invalid(name, value, e))
    }

    pub(crate) fn optional<T>(&self, name: &str) -> Result<Option<T>, FieldError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(name)
            .map(|value| value.parse().map_err(|e| self.invalid(name, value, e)))
            .transpose()
    }

    pub(crate) fn missing(&self, name: &str) -> FieldError {
        FieldError::Missing {
            path: self.path.to_path_buf(),
            field: name.to_string(),
        }
    }

    pub(crate) fn invalid(&self, name: &str, value: &str, reason: impl Display) -> FieldError {
        FieldError::Invalid {
            path: self.path.to_path_buf(),
            field: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
