//! Event submission: form validation and the submit state machine.
//!
//! A submission runs in a fixed order:
//!
//! 1. Reject anonymous callers before touching any service.
//! 2. Validate every form field and report all problems at once.
//! 3. Derive the slug and the start timestamp.
//! 4. Upload the image, if one was attached. Upload failures are logged
//!    and the event is saved without an image.
//! 5. Insert the event as `pending`.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::category::Category;
use crate::geo::Coordinates;
use crate::listing::EventRecord;
use crate::schedule::{combine_start, parse_event_date, parse_event_time};
use crate::slug::generate_slug;
use crate::status::EventStatus;
use crate::types::{LocalTimestamp, UserId};
use crate::upload::{upload_image, ImageStore, ImageUpload};

/// Shown after a successful submission.
pub const SUCCESS_MESSAGE: &str =
    "Event submitted successfully! It will be reviewed before appearing on the site.";

/// Where the client goes after a successful submission, and when.
pub const SUCCESS_REDIRECT: &str = "/events";
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Field order used when reporting validation errors.
const FIELD_ORDER: [&str; 8] = [
    "title",
    "description",
    "date",
    "time",
    "location",
    "coordinates",
    "category",
    "image",
];

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// The submission form as entered. Text inputs arrive as plain strings;
/// blank `time` means midnight and blank `price` means free.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct EventForm {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "valid_date"))]
    pub date: String,
    #[validate(custom(function = "valid_time"))]
    #[serde(default)]
    pub time: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub price: String,
    #[validate(custom(function = "known_category"))]
    pub category: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn valid_date(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    parse_event_date(value)
        .map(|_| ())
        .map_err(|_| with_message("invalid", Cow::Borrowed("Date must be in YYYY-MM-DD format")))
}

fn valid_time(value: &str) -> Result<(), ValidationError> {
    parse_event_time(Some(value))
        .map(|_| ())
        .map_err(|_| with_message("invalid", Cow::Borrowed("Time must be in HH:MM format")))
}

fn known_category(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    Category::parse(value)
        .map(|_| ())
        .map_err(|_| with_message("invalid", Cow::Owned(format!("Unknown category '{}'", value.trim()))))
}

fn with_message(code: &'static str, message: Cow<'static, str>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message);
    err
}

fn field_label(field: &str) -> &str {
    match field {
        "title" => "Title",
        "description" => "Description",
        "date" => "Date",
        "time" => "Time",
        "location" => "Location",
        "coordinates" => "Coordinates",
        "category" => "Category",
        "image" => "Image",
        other => other,
    }
}

/// One problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Combine separately submitted longitude and latitude. Both or neither
/// must be present; a lone half is a `coordinates` field error.
pub fn pair_coordinates(
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<Option<Coordinates>, FieldError> {
    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Ok(Some(Coordinates::new(longitude, latitude))),
        (None, None) => Ok(None),
        _ => Err(FieldError::new(
            "coordinates",
            "Longitude and latitude must be provided together",
        )),
    }
}

impl EventForm {
    /// Every field problem, in form order. Empty when the form is valid.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut out = Vec::new();

        if let Err(errors) = self.validate() {
            for (field, list) in errors.field_errors() {
                let field = field.to_string();
                for err in list.iter() {
                    let message = match &err.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is required", field_label(&field)),
                    };
                    out.push(FieldError::new(field.clone(), message));
                }
            }
        }

        if let Some(coordinates) = self.coordinates {
            if !coordinates.is_valid() {
                out.push(FieldError::new("coordinates", "Coordinates are out of range"));
            }
        }

        out.sort_by_key(|e| {
            FIELD_ORDER
                .iter()
                .position(|f| *f == e.field)
                .unwrap_or(FIELD_ORDER.len())
        });
        out
    }

    /// Price to store: trimmed, `None` when blank.
    pub fn price(&self) -> Option<String> {
        let price = self.price.trim();
        (!price.is_empty()).then(|| price.to_string())
    }
}

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// A validated event ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: LocalTimestamp,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub price: Option<String>,
    pub category: Category,
    pub image_url: Option<String>,
    pub slug: String,
    pub owner_id: UserId,
    pub status: EventStatus,
}

/// Where submitted events are stored.
#[async_trait]
pub trait EventWriter: Send + Sync {
    /// Insert and return the stored record. Errors carry the store's own
    /// message, which is shown to the submitter unchanged.
    async fn insert(&self, event: NewEvent) -> Result<EventRecord, String>;
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("You must be logged in to submit an event")]
    AuthRequired,

    #[error("Please fix the highlighted fields")]
    Validation { fields: Vec<FieldError> },

    #[error("{0}")]
    Persistence(String),
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub event: EventRecord,
    pub message: &'static str,
    pub redirect_to: &'static str,
    pub redirect_after: Duration,
    /// The attached image could not be stored; the event was saved without it.
    pub image_upload_failed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Editing,
    Submitting,
    Succeeded(SubmissionReceipt),
    Failed(String),
}

/// Drives one submission form through `Editing -> Submitting -> Succeeded | Failed`.
pub struct SubmissionController {
    writer: Arc<dyn EventWriter>,
    images: Arc<dyn ImageStore>,
    state: SubmissionState,
    form: EventForm,
}

impl SubmissionController {
    pub fn new(writer: Arc<dyn EventWriter>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            writer,
            images,
            state: SubmissionState::Editing,
            form: EventForm::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// The retained form. Cleared after a successful submission.
    pub fn form(&self) -> &EventForm {
        &self.form
    }

    /// Back to editing with an empty form.
    pub fn reset(&mut self) {
        self.state = SubmissionState::Editing;
        self.form = EventForm::default();
    }

    /// Submit `form` on behalf of `user`.
    pub async fn submit(
        &mut self,
        user: Option<UserId>,
        form: EventForm,
        image: Option<ImageUpload>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.form = form;

        let result = self.run(user, image).await;
        match &result {
            Ok(receipt) => {
                self.state = SubmissionState::Succeeded(receipt.clone());
                self.form = EventForm::default();
            }
            Err(e) => self.state = SubmissionState::Failed(e.to_string()),
        }
        result
    }

    async fn run(
        &mut self,
        user: Option<UserId>,
        image: Option<ImageUpload>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let owner_id = user.ok_or(SubmissionError::AuthRequired)?;

        let mut fields = self.form.field_errors();
        if let Some(image) = &image {
            if let Err(e) = image.check() {
                fields.push(FieldError::new("image", e.to_string()));
            }
        }
        if !fields.is_empty() {
            return Err(SubmissionError::Validation { fields });
        }

        let new_event = self.prepare(owner_id)?;
        self.state = SubmissionState::Submitting;

        let mut image_url = None;
        let mut image_upload_failed = false;
        if let Some(image) = image {
            let millis = chrono::Utc::now().timestamp_millis();
            match upload_image(self.images.as_ref(), image, &new_event.slug, millis).await {
                Ok(url) => image_url = Some(url),
                Err(e) => {
                    tracing::warn!(error = %e, slug = %new_event.slug, "Image upload failed, saving event without image");
                    image_upload_failed = true;
                }
            }
        }

        let event = self
            .writer
            .insert(NewEvent {
                image_url: image_url.clone(),
                ..new_event
            })
            .await
            .map_err(|message| {
                if let Some(url) = &image_url {
                    tracing::warn!(image_url = %url, "Event insert failed after image upload; object left orphaned");
                }
                SubmissionError::Persistence(message)
            })?;

        tracing::info!(event_id = event.id, owner_id = %owner_id, slug = %event.slug, "Event submitted");

        Ok(SubmissionReceipt {
            event,
            message: SUCCESS_MESSAGE,
            redirect_to: SUCCESS_REDIRECT,
            redirect_after: SUCCESS_REDIRECT_DELAY,
            image_upload_failed,
        })
    }

    /// Build the insert payload from an already validated form.
    fn prepare(&self, owner_id: UserId) -> Result<NewEvent, SubmissionError> {
        let invalid = |field: &str, message: String| SubmissionError::Validation {
            fields: vec![FieldError::new(field, message)],
        };

        let form = &self.form;
        let date = parse_event_date(&form.date).map_err(|e| invalid("date", e.to_string()))?;
        let time =
            parse_event_time(Some(&form.time)).map_err(|e| invalid("time", e.to_string()))?;
        let category =
            Category::parse(&form.category).map_err(|e| invalid("category", e.to_string()))?;

        Ok(NewEvent {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            starts_at: combine_start(date, time),
            location: form.location.trim().to_string(),
            coordinates: form.coordinates,
            price: form.price(),
            category,
            image_url: None,
            slug: generate_slug(&form.title),
            owner_id,
            status: EventStatus::Pending,
        })
    }
}
