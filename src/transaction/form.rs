//! The transaction form: the raw user input, its validation, and the HTML fields.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::{Transaction, TransactionId, TransactionType, date::parse_date_or_now},
};

/// The reasons user input for a transaction can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was missing or only contained whitespace.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The transaction type was neither income nor expense.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidType(String),

    /// The amount was not a finite, non-negative number.
    #[error("\"{0}\" is not a valid amount, amounts must be numbers that are zero or more")]
    InvalidAmount(String),

    /// The amount had fractions of a cent.
    #[error("\"{0}\" has more than two decimal places")]
    TooPrecise(String),
}

/// The form data for adding or editing a transaction, exactly as submitted.
///
/// Every field is optional so that missing fields can be reported as a
/// [ValidationError] instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// "income" or "expense".
    #[serde(default, alias = "type")]
    pub type_: Option<String>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The value of the transaction, e.g. "12.34".
    #[serde(default)]
    pub amount: Option<String>,
    /// When the transaction occurred, see [crate::transaction::date::parse_date].
    #[serde(default)]
    pub date: Option<String>,
    /// An optional category name.
    #[serde(default)]
    pub category: Option<String>,
}

/// The validated contents of a [TransactionForm], everything but the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub type_: TransactionType,
    pub description: String,
    pub amount: f64,
    pub date: OffsetDateTime,
    pub category: Option<String>,
}

impl TransactionFields {
    /// Attach `id` to the fields to create a full record.
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            type_: self.type_,
            description: self.description,
            amount: self.amount,
            date: self.date,
            category: self.category,
        }
    }
}

impl TransactionForm {
    /// Check that every required field is present and well-formed.
    ///
    /// Dates without an offset are read in `local_timezone`, a canonical
    /// timezone name. A date that is present but cannot be parsed is replaced
    /// with `now`.
    ///
    /// # Errors
    /// Returns the [ValidationError] for the first invalid field, checked in
    /// the order type, description, amount, date.
    pub fn validate(
        &self,
        now: OffsetDateTime,
        local_timezone: &str,
    ) -> Result<TransactionFields, ValidationError> {
        let type_text = required(&self.type_, "type")?;
        let type_ = type_text
            .parse::<TransactionType>()
            .map_err(|_| ValidationError::InvalidType(type_text.to_owned()))?;

        let description = required(&self.description, "description")?.to_owned();

        let amount_text = required(&self.amount, "amount")?;
        let amount = parse_amount(amount_text)?;

        let date = parse_date_or_now(required(&self.date, "date")?, local_timezone, now);

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);

        Ok(TransactionFields {
            type_,
            description,
            amount,
            date,
            category,
        })
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field_name: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingField(field_name))
}

fn parse_amount(text: &str) -> Result<f64, ValidationError> {
    match text.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => {
            if has_whole_cents(amount) {
                Ok(amount)
            } else {
                Err(ValidationError::TooPrecise(text.to_owned()))
            }
        }
        _ => Err(ValidationError::InvalidAmount(text.to_owned())),
    }
}

/// Whether `amount` has at most two decimal places, allowing for the rounding
/// error of decimal fractions like 0.29.
fn has_whole_cents(amount: f64) -> bool {
    let cents = amount * 100.0;

    (cents - cents.round()).abs() < 1e-6
}

// ============================================================================
// HTML
// ============================================================================

pub struct TransactionFormDefaults<'a> {
    /// Prefix for element IDs so two forms can live on the same page.
    pub id_prefix: &'a str,
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub autofocus_description: bool,
}

impl<'a> TransactionFormDefaults<'a> {
    /// Defaults for a blank form dated `today`.
    pub fn blank(id_prefix: &'a str, today: Date) -> Self {
        Self {
            id_prefix,
            transaction_type: TransactionType::Income,
            amount: None,
            date: today,
            description: None,
            category: None,
            autofocus_description: false,
        }
    }

    /// Defaults prefilled from an existing transaction, with its date shown as `date`.
    pub fn from_transaction(id_prefix: &'a str, transaction: &'a Transaction, date: Date) -> Self {
        Self {
            id_prefix,
            transaction_type: transaction.type_,
            amount: Some(transaction.amount),
            date,
            description: Some(&transaction.description),
            category: transaction.category.as_deref(),
            autofocus_description: true,
        }
    }
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let is_income = matches!(defaults.transaction_type, TransactionType::Income);
    // Amounts from the backend may have more decimal places than the form
    // accepts, show them unrounded so saving cannot silently change them.
    let amount_str = defaults.amount.map(|amount| amount.to_string());
    let prefix = defaults.id_prefix;
    let income_id = format!("{prefix}-type-income");
    let expense_id = format!("{prefix}-type-expense");
    let description_id = format!("{prefix}-description");
    let amount_id = format!("{prefix}-amount");
    let date_id = format!("{prefix}-date");
    let category_id = format!("{prefix}-category");

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id=(income_id)
                        type="radio"
                        value="income"
                        checked[is_income]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label for=(income_id) class=(FORM_RADIO_LABEL_STYLE) { "Income" }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id=(expense_id)
                        type="radio"
                        value="expense"
                        checked[!is_income]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label for=(expense_id) class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
                }
            }
        }

        div
        {
            label for=(description_id) class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id=(description_id)
                type="text"
                placeholder="e.g. Product sales"
                required
                value=[defaults.description]
                autofocus[defaults.autofocus_description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for=(amount_id) class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id=(amount_id)
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for=(date_id) class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id=(date_id)
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for=(category_id) class=(FORM_LABEL_STYLE) { "Category (optional)" }

            input
                name="category"
                id=(category_id)
                type="text"
                placeholder="e.g. Groceries"
                value=[defaults.category]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}


#[cfg(test)]
mod html_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{TransactionFormDefaults, transaction_form_fields};
    use crate::transaction::TransactionType;

    #[test]
    fn amount_is_prefilled_unrounded() {
        let fields = transaction_form_fields(&TransactionFormDefaults {
            amount: Some(0.125),
            ..TransactionFormDefaults::blank("test", date!(2024 - 01 - 01))
        });
        let markup = maud::html! { form { (fields) } };
        let html = Html::parse_document(&markup.into_string());

        let amount = html
            .select(&Selector::parse("#test-amount").unwrap())
            .next()
            .unwrap();
        assert_eq!(amount.value().attr("value"), Some("0.125"));
    }

    #[test]
    fn transaction_form_fields_checks_selected_type() {
        let cases = [
            (TransactionType::Expense, "expense"),
            (TransactionType::Income, "income"),
        ];

        for (transaction_type, expected) in cases {
            let html = render_fields(transaction_type);
            assert_checked_value(&html, expected);
        }
    }

    #[test]
    fn ids_use_prefix() {
        let html = render_fields(TransactionType::Income);

        let selector = Selector::parse("#test-amount").unwrap();
        assert_eq!(html.select(&selector).count(), 1);
    }

    fn render_fields(transaction_type: TransactionType) -> Html {
        let fields = transaction_form_fields(&TransactionFormDefaults {
            transaction_type,
            ..TransactionFormDefaults::blank("test", date!(2024 - 01 - 01))
        });
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    fn assert_checked_value(document: &Html, expected: &str) {
        let selector = Selector::parse("input[type=radio][name=type_]").unwrap();
        let inputs = document.select(&selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            2,
            "want 2 transaction type inputs, got {}",
            inputs.len()
        );

        let checked = inputs
            .iter()
            .find(|input| input.value().attr("checked").is_some())
            .and_then(|input| input.value().attr("value"));
        assert_eq!(
            checked,
            Some(expected),
            "want checked transaction type to be {expected}, got {checked:?}"
        );
    }
}
