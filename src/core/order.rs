//! Order intake: the first stage of the workflow
//!
//! [`OrderDraft`] is the editable form. It always holds exactly as many boxes
//! as the declared box count. [`OrderDraft::submit`] turns a complete draft
//! into an immutable [`Order`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::aggregate;
use crate::core::error::{QuantityViolation, SessionError, ValidationError};

/// Default ceiling on the declared box count
pub const DEFAULT_MAX_BOXES: u32 = 500;

/// One physical box line item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxEntry {
    pub box_number: String,
    pub variety: String,
    pub plant_quantity: u32,
}

impl BoxEntry {
    /// A box with every field still to be filled in
    pub fn blank() -> Self {
        Self::default()
    }

    fn first_missing_field(&self) -> Option<&'static str> {
        if is_blank(&self.box_number) {
            Some("box_number")
        } else if is_blank(&self.variety) {
            Some("variety")
        } else if self.plant_quantity == 0 {
            Some("plant_quantity")
        } else {
            None
        }
    }
}

/// A submitted order
///
/// Produced only by [`OrderDraft::submit`] in normal operation. The fields
/// stay public so a summary can be built from any order, including one that
/// was assembled elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,
    pub date: NaiveDate,
    pub description: String,
    pub boxes: Vec<BoxEntry>,
    /// Declared box count
    pub total_boxes: u32,
    /// Sum of `boxes[].plant_quantity` at submit time
    pub total_plants: u64,
}

/// Order metadata edited as a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

/// The editable order form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    order_number: String,
    date: Option<NaiveDate>,
    description: String,
    boxes: Vec<BoxEntry>,
    #[serde(skip)]
    max_boxes: u32,
}

impl OrderDraft {
    /// Empty draft dated `today`, with no boxes declared
    pub fn new(today: NaiveDate) -> Self {
        Self {
            order_number: String::new(),
            date: Some(today),
            description: String::new(),
            boxes: Vec::new(),
            max_boxes: DEFAULT_MAX_BOXES,
        }
    }

    /// Override the ceiling on the declared box count
    pub fn with_max_boxes(mut self, max_boxes: u32) -> Self {
        self.max_boxes = max_boxes;
        self
    }

    pub fn details(&self) -> OrderDetails {
        OrderDetails {
            order_number: self.order_number.clone(),
            date: self.date,
            description: self.description.clone(),
        }
    }

    pub fn set_details(&mut self, details: OrderDetails) {
        self.order_number = details.order_number;
        self.date = details.date;
        self.description = details.description;
    }

    pub fn boxes(&self) -> &[BoxEntry] {
        &self.boxes
    }

    /// Declared box count; always equal to the number of boxes held
    pub fn box_count(&self) -> u32 {
        self.boxes.len() as u32
    }

    /// Resize the box list to `count`
    ///
    /// Growing appends blank boxes, shrinking drops trailing ones. Boxes below
    /// the smaller of the old and new counts are left untouched.
    pub fn set_box_count(&mut self, count: u32) -> Result<(), ValidationError> {
        if count > self.max_boxes {
            return Err(QuantityViolation::TooManyBoxes {
                requested: count,
                limit: self.max_boxes,
            }
            .into());
        }
        self.boxes.resize_with(count as usize, BoxEntry::blank);
        Ok(())
    }

    /// Replace the box at `index` with `entry`
    pub fn update_box(&mut self, index: usize, entry: BoxEntry) -> Result<(), SessionError> {
        let len = self.boxes.len();
        let slot = self
            .boxes
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange {
                collection: "box",
                index,
                len,
            })?;
        *slot = entry;
        Ok(())
    }

    /// Remove the box at `index`, lowering the declared count by one
    ///
    /// The last remaining box cannot be removed; that call is a no-op.
    pub fn remove_box(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.boxes.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange {
                collection: "box",
                index,
                len,
            });
        }
        if len > 1 {
            self.boxes.remove(index);
        }
        Ok(())
    }

    /// Running plant total over the boxes entered so far
    pub fn total_plants(&self) -> u64 {
        aggregate::total_box_plants(&self.boxes)
    }

    /// Validate the draft and produce an [`Order`]
    ///
    /// Metadata is checked before boxes; the first problem found is reported.
    /// The draft is never modified.
    pub fn submit(&self) -> Result<Order, ValidationError> {
        if is_blank(&self.order_number) {
            return Err(ValidationError::missing("order_number"));
        }
        let Some(date) = self.date else {
            return Err(ValidationError::missing("date"));
        };
        if is_blank(&self.description) {
            return Err(ValidationError::missing("description"));
        }
        if self.boxes.is_empty() {
            return Err(ValidationError::missing("box_count"));
        }
        for (index, entry) in self.boxes.iter().enumerate() {
            if let Some(field) = entry.first_missing_field() {
                return Err(ValidationError::missing_at(field, index));
            }
        }

        Ok(Order {
            order_number: self.order_number.clone(),
            date,
            description: self.description.clone(),
            boxes: self.boxes.clone(),
            total_boxes: self.box_count(),
            total_plants: self.total_plants(),
        })
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
