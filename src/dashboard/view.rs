//! HTML rendering for the dashboard page.

use maud::{Markup, html};
use time::{Date, OffsetDateTime, UtcOffset};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    dashboard::{
        cards::aggregate_cards_view,
        interaction::{DashboardQuery, InteractionState, Tab},
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency,
        format_date, loading_spinner,
    },
    navigation::NavBar,
    timezone::to_local_date,
    transaction::{Aggregates, Transaction, TransactionFormDefaults, transaction_form_fields},
};

/// The max number of graphemes to display in the transaction list before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 40;

/// The dialog drawn over the dashboard.
pub(super) enum Dialog<'a> {
    None,
    Edit {
        transaction: &'a Transaction,
        /// Where to go once the changes are saved.
        on_save_url: String,
    },
    ConfirmDelete {
        transaction: &'a Transaction,
        /// Where to go once the transaction is deleted.
        on_delete_url: String,
    },
}

/// Everything needed to render the dashboard.
pub(super) struct DashboardView<'a> {
    pub aggregates: Aggregates,
    pub tab: Tab,
    /// The transactions in the selected tab, in the order they were added.
    pub transactions: Vec<&'a Transaction>,
    pub dialog: Dialog<'a>,
    /// The URL that closes the dialog.
    pub cancel_url: String,
    /// The canonical name of the timezone dates are shown in.
    pub local_timezone: &'a str,
    pub today: Date,
}

pub(super) fn dashboard_view(view: DashboardView<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let current_url = DashboardQuery::new(view.tab, InteractionState::Idle).to_url();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }

                (aggregate_cards_view(&view.aggregates))

                div class="grid grid-cols-1 md:grid-cols-3 gap-6"
                {
                    div class={ "md:col-span-1 " (CARD_STYLE) }
                    {
                        (new_transaction_form(view.today, &current_url))
                    }

                    div class={ "md:col-span-2 " (CARD_STYLE) }
                    {
                        (tab_bar(view.tab))
                        (transaction_list(&view.transactions, view.tab, view.local_timezone))
                    }
                }
            }
        }

        @match view.dialog {
            Dialog::None => {},
            Dialog::Edit { transaction, on_save_url } => {
                (edit_dialog(transaction, &on_save_url, &view.cancel_url, view.local_timezone))
            },
            Dialog::ConfirmDelete { transaction, on_delete_url } => {
                (delete_dialog(transaction, &on_delete_url, &view.cancel_url))
            },
        }
    };

    base("Dashboard", &[dollar_input_styles()], &content)
}

/// Append `redirect_url` to `endpoint` as the `redirect_url` query parameter.
fn with_redirect(endpoint: &str, redirect_url: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_url)]) {
        Ok(query) => format!("{endpoint}?{query}"),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_url:?}: {error}");
            endpoint.to_owned()
        }
    }
}

fn new_transaction_form(today: Date, current_url: &str) -> Markup {
    let spinner = loading_spinner();
    let defaults = TransactionFormDefaults::blank("new", today);

    html! {
        form
            id="new-transaction-form"
            hx-post=(with_redirect(endpoints::TRANSACTIONS_API, current_url))
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            (transaction_form_fields(&defaults))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span
                    id="indicator"
                    class="inline htmx-indicator"
                {
                    (spinner)
                }
                " Add Transaction"
            }
        }
    }
}

fn tab_bar(active_tab: Tab) -> Markup {
    html! {
        nav
            class="flex gap-2 mb-4 border-b border-gray-200 dark:border-gray-700"
            aria-label="Transaction types"
        {
            @for tab in Tab::ALL {
                @let is_active = tab == active_tab;
                @let tab_style = if is_active {
                    "border-blue-600 text-blue-600 dark:text-blue-400"
                } else {
                    "border-transparent text-gray-600 hover:text-gray-900 \
                    dark:text-gray-400 dark:hover:text-white"
                };
                a
                    href=(DashboardQuery::new(tab, InteractionState::Idle).to_url())
                    aria-current=[is_active.then_some("page")]
                    class={ "px-4 py-2 -mb-px text-sm font-medium border-b-2 " (tab_style) }
                {
                    (tab.label())
                }
            }
        }
    }
}

fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}

/// The calendar date of `date_time` where the user is.
fn local_date(date_time: OffsetDateTime, local_timezone: &str) -> Date {
    to_local_date(date_time, local_timezone).unwrap_or_else(|| {
        tracing::warn!("Unknown timezone \"{local_timezone}\", showing {date_time} in UTC");
        date_time.to_offset(UtcOffset::UTC).date()
    })
}

fn transaction_list(transactions: &[&Transaction], tab: Tab, local_timezone: &str) -> Markup {
    if transactions.is_empty() {
        let message = match tab {
            Tab::All => "No transactions yet. Add one with the form.",
            Tab::Income => "No income yet.",
            Tab::Expense => "No expenses yet.",
        };

        return html! {
            p id="empty-transactions" class="text-gray-600 dark:text-gray-400" { (message) }
        };
    }

    html! {
        ul id="transactions" class="divide-y divide-gray-200 dark:divide-gray-700"
        {
            @for transaction in transactions {
                (transaction_item(transaction, tab, local_timezone))
            }
        }
    }
}

fn transaction_item(transaction: &Transaction, tab: Tab, local_timezone: &str) -> Markup {
    let id = transaction.id;
    let (description, full_description) = format_description(&transaction.description);
    let amount = transaction.signed_amount();
    let date = format_date(local_date(transaction.date, local_timezone));
    let edit_url = DashboardQuery::new(tab, InteractionState::Editing { id }).to_url();
    let delete_url = DashboardQuery::new(tab, InteractionState::PendingDelete { id }).to_url();

    html! {
        li
            class="flex items-center justify-between py-3 gap-4"
            data-transaction-id=(id)
        {
            div class="min-w-0"
            {
                p class="font-medium truncate" title=[full_description] { (description) }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (date)
                    @if let Some(category) = &transaction.category {
                        " • " (category)
                    }
                }
            }

            div class="flex items-center gap-4 shrink-0"
            {
                span class={ "font-semibold " (amount_class(amount)) } { (format_currency(amount)) }

                a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                a href=(delete_url) class="text-red-600 hover:text-red-500 dark:text-red-500 underline"
                {
                    "Delete"
                }
            }
        }
    }
}

fn dialog_container(id: &str, role: &str, content: Markup) -> Markup {
    html! {
        div
            id=(id)
            role=(role)
            aria-modal="true"
            class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50 px-4"
        {
            div class={ "w-full max-w-md " (CARD_STYLE) }
            {
                (content)
            }
        }
    }
}

fn edit_dialog(
    transaction: &Transaction,
    on_save_url: &str,
    cancel_url: &str,
    local_timezone: &str,
) -> Markup {
    let date = local_date(transaction.date, local_timezone);
    let defaults = TransactionFormDefaults::from_transaction("edit", transaction, date);
    let update_url = with_redirect(
        &format_endpoint(endpoints::TRANSACTION, transaction.id),
        on_save_url,
    );

    dialog_container(
        "edit-dialog",
        "dialog",
        html! {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (transaction_form_fields(&defaults))

                div class="flex gap-4"
                {
                    a href=(cancel_url) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
                }
            }
        },
    )
}

fn delete_dialog(transaction: &Transaction, on_delete_url: &str, cancel_url: &str) -> Markup {
    let delete_url = with_redirect(
        &format_endpoint(endpoints::TRANSACTION, transaction.id),
        on_delete_url,
    );

    dialog_container(
        "delete-dialog",
        "alertdialog",
        html! {
            h2 class="text-xl font-bold mb-2" { "Delete Transaction" }

            p class="mb-6"
            {
                "Are you sure you want to delete \"" (transaction.description) "\" ("
                (format_currency(transaction.signed_amount()))
                ")? This cannot be undone."
            }

            div class="flex gap-4"
            {
                a href=(cancel_url) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{MAX_DESCRIPTION_GRAPHEMES, format_description, with_redirect};

    #[test]
    fn short_descriptions_are_unchanged() {
        assert_eq!(format_description("Rent"), ("Rent".to_owned(), None));
    }

    #[test]
    fn long_descriptions_are_truncated_by_grapheme() {
        let description = "🏠".repeat(MAX_DESCRIPTION_GRAPHEMES + 1);

        let (truncated, full) = format_description(&description);

        assert_eq!(
            truncated,
            "🏠".repeat(MAX_DESCRIPTION_GRAPHEMES - 3) + "..."
        );
        assert_eq!(full, Some(description.as_str()));
    }

    #[test]
    fn redirect_is_url_encoded() {
        assert_eq!(
            with_redirect("/api/transactions", "/dashboard?tab=income"),
            "/api/transactions?redirect_url=%2Fdashboard%3Ftab%3Dincome"
        );
    }
}
