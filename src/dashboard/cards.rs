//! Card components for the dashboard totals.

use maud::{Markup, html};

use crate::{
    html::{CARD_STYLE, format_currency},
    transaction::Aggregates,
};

/// Renders the income, expense and profit cards.
pub(super) fn aggregate_cards_view(aggregates: &Aggregates) -> Markup {
    let profit_style = if aggregates.profit < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        section
            class="w-full grid grid-cols-1 md:grid-cols-3 gap-4"
            aria-label="Totals"
        {
            (aggregate_card(
                "total-income",
                "Total income",
                aggregates.total_income,
                "text-green-600 dark:text-green-400",
            ))
            (aggregate_card(
                "total-expense",
                "Total expenses",
                aggregates.total_expense,
                "text-red-600 dark:text-red-400",
            ))
            (aggregate_card("profit", "Profit", aggregates.profit, profit_style))
        }
    }
}

fn aggregate_card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }

            p class={ "mt-2 text-2xl font-bold " (amount_style) }
            {
                (format_currency(amount))
            }
        }
    }
}
