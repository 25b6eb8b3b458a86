use crate::catalog::Vehicle;
use crate::pricing::compute_quote;
use crate::pricing::Availability;
use crate::pricing::DuplicatePolicy;
use crate::pricing::PriceTable;
use crate::pricing::PricingError;
use crate::pricing::Quote;
use crate::pricing::Selection;
use crate::pricing::MAX_SELECTIONS;

/// An in-progress quote: the chosen vehicle's classification and the options picked so far.
///
/// Every selection is validated when it is made, so `quote()` only fails on overflow.
#[derive(Clone, Debug)]
pub struct QuoteForm<'a> {
    table: &'a PriceTable,
    policy: DuplicatePolicy,
    classification: Option<String>,
    base_price: Option<u64>,
    selections: Vec<Selection>,
}

impl<'a> QuoteForm<'a> {
    pub fn new(table: &'a PriceTable, policy: DuplicatePolicy) -> QuoteForm<'a> {
        QuoteForm {
            table,
            policy,
            classification: None,
            base_price: None,
            selections: Vec::new(),
        }
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }

    pub fn base_price(&self) -> Option<u64> {
        self.base_price
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Options offered under the current classification.
    pub fn offered(&self) -> Availability<'a> {
        match &self.classification {
            Some(classification) => self.table.offered(classification),
            None => Availability::NoOptions,
        }
    }

    /// Switches to another vehicle.
    ///
    /// # Returns
    /// The selections dropped because the vehicle's classification does not offer them
    pub fn set_vehicle(&mut self, vehicle: &Vehicle) -> Vec<Selection> {
        self.base_price = vehicle.base_price;
        self.set_classification(vehicle.classification.as_deref())
    }

    /// Switches classification, dropping and returning selections it does not offer.
    pub fn set_classification(&mut self, classification: Option<&str>) -> Vec<Selection> {
        self.classification = classification.map(|classification| classification.trim().to_owned());
        let availability = self.offered();
        let (kept, dropped) = std::mem::take(&mut self.selections)
            .into_iter()
            .partition::<Vec<Selection>, _>(|selection| match availability {
                Availability::Options(options) => options.contains(&selection.option),
                Availability::NoOptions => false,
            });
        self.selections = kept;
        if !dropped.is_empty() {
            log::debug!(
                "Classification {:?} drops {}",
                self.classification,
                dropped.iter().map(|selection| selection.option.as_str()).collect::<Vec<&str>>().join(", ")
            );
        }
        dropped
    }

    pub fn set_base_price(&mut self, base_price: Option<u64>) {
        self.base_price = base_price;
    }

    /// Adds a selection after checking it against the current classification.
    pub fn select(&mut self, selection: Selection) -> Result<(), PricingError> {
        if self.selections.len() >= MAX_SELECTIONS {
            Err(PricingError::TooManySelections(self.selections.len() + 1))?
        }
        let label = self.classification.as_deref().unwrap_or_default();
        match self.offered() {
            Availability::NoOptions => Err(PricingError::NoOptionsAvailable(label.to_owned()))?,
            Availability::Options(options) if !options.contains(&selection.option) => {
                Err(PricingError::OptionNotOffered(selection.option.to_owned(), label.to_owned()))?
            }
            Availability::Options(_) => (),
        }
        if self.policy == DuplicatePolicy::Reject && self.selections.iter().any(|previous| previous.option == selection.option) {
            Err(PricingError::DuplicateSelection(selection.option.to_owned()))?
        }
        self.selections.push(selection);
        Ok(())
    }

    /// Removes the selection at a position.
    pub fn remove(&mut self, index: usize) -> Result<Selection, PricingError> {
        if index >= self.selections.len() {
            Err(PricingError::SelectionIndexOutOfRange(index))?
        }
        Ok(self.selections.remove(index))
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Prices the current selections.
    pub fn quote(&self) -> Result<Quote, PricingError> {
        compute_quote(self.table, self.classification(), self.base_price, &self.selections, self.policy)
    }
}
