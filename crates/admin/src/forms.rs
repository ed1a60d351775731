//! Dashboard form state machines.
//!
//! One [`EntityForm`] per open form. It owns its own [`FormState`]; nothing
//! is shared between forms. Rendering, navigation and toasts belong to the
//! UI layer, which applies the [`Effects`] a transition returns.

use serde::Serialize;
use tracing::{debug, warn};

use storedash_core::{EntityKind, StoreId};

use crate::client::{ApiError, CatalogApi};
use crate::models::{
    BillboardInput, CategoryInput, ColorInput, ProductInput, SizeInput, SubcategoryInput, Validate,
};

const GENERIC_FAILURE: &str = "Something went wrong.";
const LOCKED_UPDATE: &str = "Locked items can't be modified.";
const LOCKED_DELETE: &str = "Locked items can't be deleted.";

/// Field values a catalog form edits.
pub trait FormValues: Validate + Serialize + Send + Sync {
    const KIND: EntityKind;
}

impl FormValues for BillboardInput {
    const KIND: EntityKind = EntityKind::Billboard;
}

impl FormValues for CategoryInput {
    const KIND: EntityKind = EntityKind::Category;
}

impl FormValues for SubcategoryInput {
    const KIND: EntityKind = EntityKind::Subcategory;
}

impl FormValues for SizeInput {
    const KIND: EntityKind = EntityKind::Size;
}

impl FormValues for ColorInput {
    const KIND: EntityKind = EntityKind::Color;
}

impl FormValues for ProductInput {
    const KIND: EntityKind = EntityKind::Product;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Per-form UI state. The submit control is disabled while `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormState {
    pub phase: Phase,
    pub delete_confirm_open: bool,
}

/// A toast for the UI to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// What the UI should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effects {
    pub notice: Option<Notice>,
    /// Dashboard path to navigate to, e.g. `/store1/billboards`.
    pub navigate_to: Option<String>,
    /// Re-fetch server data for the current view.
    pub refresh: bool,
}

/// Result of a submit or delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// A request from this form is already in flight.
    Busy,
    /// The action does not apply in the current state.
    Ignored,
    Done(Effects),
}

/// Create or edit form for one catalog entity.
#[derive(Debug, Clone)]
pub struct EntityForm<V> {
    store_id: StoreId,
    entity_id: Option<String>,
    values: V,
    state: FormState,
}

impl<V: FormValues> EntityForm<V> {
    /// A form for a new row.
    pub fn create(store_id: StoreId, values: V) -> Self {
        Self {
            store_id,
            entity_id: None,
            values,
            state: FormState::default(),
        }
    }

    /// A form editing the existing row `entity_id`.
    pub fn edit(store_id: StoreId, entity_id: impl Into<String>, values: V) -> Self {
        Self {
            store_id,
            entity_id: Some(entity_id.into()),
            values,
            state: FormState::default(),
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut V {
        &mut self.values
    }

    pub fn is_editing(&self) -> bool {
        self.entity_id.is_some()
    }

    /// Heading, e.g. "Edit billboard" or "Create billboard".
    pub fn title(&self) -> String {
        let noun = V::KIND.label().to_lowercase();
        if self.is_editing() {
            format!("Edit {noun}")
        } else {
            format!("Create {noun}")
        }
    }

    pub fn description(&self) -> String {
        let noun = V::KIND.label().to_lowercase();
        if self.is_editing() {
            format!("Edit a {noun}")
        } else {
            format!("Add a new {noun}")
        }
    }

    /// Submit button label.
    pub fn action_label(&self) -> &'static str {
        if self.is_editing() {
            "Save changes"
        } else {
            "Create"
        }
    }

    /// The list view this form returns to.
    pub fn list_path(&self) -> String {
        format!("/{}/{}", self.store_id, V::KIND.segment())
    }

    /// Enter `Submitting`. Returns false if a request is already in flight.
    pub fn begin_submit(&mut self) -> bool {
        if self.state.phase == Phase::Submitting {
            return false;
        }
        self.state.phase = Phase::Submitting;
        true
    }

    /// Leave `Submitting`, whatever the outcome.
    pub fn finish_submit(&mut self) {
        self.state.phase = Phase::Idle;
    }

    /// Validate and save: PATCH when editing, POST when creating.
    pub async fn submit(&mut self, api: &dyn CatalogApi) -> FormOutcome {
        if self.state.phase == Phase::Submitting {
            return FormOutcome::Busy;
        }

        if let Err(e) = self.values.validate() {
            debug!(kind = %V::KIND, error = %e, "form failed validation");
            return FormOutcome::Done(Effects {
                notice: Some(Notice::Error(e.message().to_owned())),
                ..Effects::default()
            });
        }

        let body = match serde_json::to_value(&self.values) {
            Ok(body) => body,
            Err(e) => {
                warn!(kind = %V::KIND, error = %e, "failed to serialize form values");
                return FormOutcome::Done(Effects {
                    notice: Some(Notice::Error(GENERIC_FAILURE.to_owned())),
                    ..Effects::default()
                });
            }
        };

        if !self.begin_submit() {
            return FormOutcome::Busy;
        }

        let result = match self.entity_id.as_deref() {
            Some(id) => api.update(V::KIND, &self.store_id, id, &body).await,
            None => api.create(V::KIND, &self.store_id, &body).await,
        };

        let verb = if self.is_editing() { "updated" } else { "created" };
        let effects = match result {
            Ok(_) => self.leave(Notice::Success(format!("{} {verb}.", V::KIND.label()))),
            Err(e) if e.is_lock_conflict() => self.leave(Notice::Error(LOCKED_UPDATE.to_owned())),
            Err(e) => {
                log_failure(V::KIND, "save", &e);
                Effects {
                    notice: Some(Notice::Error(GENERIC_FAILURE.to_owned())),
                    ..Effects::default()
                }
            }
        };

        self.finish_submit();
        FormOutcome::Done(effects)
    }

    /// Open the delete confirmation dialog. Only existing rows can be deleted.
    pub fn open_delete_confirm(&mut self) -> bool {
        if self.entity_id.is_none() {
            return false;
        }
        self.state.delete_confirm_open = true;
        true
    }

    pub fn close_delete_confirm(&mut self) {
        self.state.delete_confirm_open = false;
    }

    /// Delete the row after the user confirmed the dialog.
    pub async fn confirm_delete(&mut self, api: &dyn CatalogApi) -> FormOutcome {
        if !self.state.delete_confirm_open {
            return FormOutcome::Ignored;
        }
        let Some(id) = self.entity_id.clone() else {
            self.close_delete_confirm();
            return FormOutcome::Ignored;
        };
        if !self.begin_submit() {
            return FormOutcome::Busy;
        }

        let effects = match api.delete(V::KIND, &self.store_id, &id).await {
            Ok(_) => self.leave(Notice::Success(format!("{} deleted.", V::KIND.label()))),
            Err(e) if e.is_lock_conflict() => self.leave(Notice::Error(LOCKED_DELETE.to_owned())),
            Err(e) => {
                log_failure(V::KIND, "delete", &e);
                Effects {
                    notice: Some(Notice::Error(
                        V::KIND.delete_blocked_message().to_owned(),
                    )),
                    ..Effects::default()
                }
            }
        };

        self.close_delete_confirm();
        self.finish_submit();
        FormOutcome::Done(effects)
    }

    /// Navigate back to the list and refresh it.
    fn leave(&self, notice: Notice) -> Effects {
        Effects {
            notice: Some(notice),
            navigate_to: Some(self.list_path()),
            refresh: true,
        }
    }
}

fn log_failure(kind: EntityKind, action: &str, e: &ApiError) {
    warn!(kind = %kind, action, status = e.status, error = %e, "catalog request failed");
}
