use fennel_core::{Amount, TransactionJournal};

use crate::trigger::{Trigger, TriggerError, TriggerType};

/// Fires when a journal's amount is strictly below a fixed threshold.
#[derive(Debug, Clone)]
pub struct AmountLess {
    threshold: Amount,
    stop_processing: bool,
}

impl AmountLess {
    pub fn new(value: &str, stop_processing: bool) -> Result<Self, TriggerError> {
        let threshold: Amount = value.parse().map_err(|_| TriggerError::InvalidValue {
            trigger: TriggerType::AmountLess.key().to_string(),
            value: value.to_string(),
        })?;
        Ok(Self {
            threshold,
            stop_processing,
        })
    }

    pub fn threshold(&self) -> Amount {
        self.threshold
    }

    /// A trigger without a value has no restriction at all. Any concrete
    /// threshold, even one that matches nearly every journal, is accepted.
    pub fn will_match_everything(value: Option<&str>) -> bool {
        if value.is_some() {
            return false;
        }
        tracing::error!("Cannot use AmountLess with a null value.");
        true
    }
}

impl Trigger for AmountLess {
    fn triggered(&self, journal: &TransactionJournal) -> bool {
        let amount = journal
            .destination_amount
            .unwrap_or_else(|| journal.amount_positive());

        if amount < self.threshold {
            tracing::debug!(
                journal = journal.id,
                %amount,
                threshold = %self.threshold,
                "RuleTrigger AmountLess: amount is less than threshold"
            );
            return true;
        }

        tracing::debug!(
            journal = journal.id,
            %amount,
            threshold = %self.threshold,
            "RuleTrigger AmountLess: amount is NOT less than threshold"
        );
        false
    }

    fn stop_processing(&self) -> bool {
        self.stop_processing
    }
}
