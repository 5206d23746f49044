//! Layout-neutral rendering of a [`StructuredReport`].
//!
//! The screen, text, PDF and print exports all walk the same [`Document`],
//! so the row order and labels below are the single source for every
//! output format. Only the totals provided by the report are shown; nothing
//! is recomputed here apart from the equity-plus-liabilities sum.

use serde::Serialize;

use super::format::format_money;
use super::model::{LineItem, StructuredReport};

pub const REPORT_TITLE: &str = "Annual Report & Financial Statements";
const NO_OPINION: &str = "No auditor opinion generated.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub letterhead: Letterhead,
    pub sections: Vec<Section>,
    pub footer: Footer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Letterhead {
    pub company: String,
    pub title: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Opinion {
        title: String,
        text: String,
    },
    Statement {
        title: String,
        subtitle: Option<String>,
        groups: Vec<RowGroup>,
    },
    Notes {
        title: String,
        notes: Vec<String>,
    },
}

/// A column of rows; the financial position statement has two
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGroup {
    pub heading: Option<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    Heading,
    SubHeading,
    Item,
    Placeholder,
    Subtotal,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub label: String,
    pub amount: Option<f64>,
    /// Formatted amount, empty for rows without one
    pub display: String,
    pub style: RowStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub sign_off: String,
    pub signatories: Vec<String>,
    pub generated_by: String,
}

struct Rows<'a> {
    currency_symbol: &'a str,
    rows: Vec<Row>,
}

impl<'a> Rows<'a> {
    fn new(currency_symbol: &'a str) -> Self {
        Self {
            currency_symbol,
            rows: Vec::new(),
        }
    }

    fn label(&mut self, style: RowStyle, label: &str) -> &mut Self {
        self.rows.push(Row {
            label: label.to_string(),
            amount: None,
            display: String::new(),
            style,
        });
        self
    }

    fn amount(&mut self, style: RowStyle, label: &str, amount: f64) -> &mut Self {
        self.rows.push(Row {
            label: label.to_string(),
            amount: Some(amount),
            display: format_money(amount, self.currency_symbol),
            style,
        });
        self
    }

    /// Line items, negated for deductions
    fn items(&mut self, items: &[LineItem], sign: f64) -> &mut Self {
        for item in items {
            self.amount(RowStyle::Item, &item.description, sign * item.amount);
        }
        self
    }

    fn items_or(&mut self, items: &[LineItem], placeholder: &str) -> &mut Self {
        if items.is_empty() {
            self.label(RowStyle::Placeholder, placeholder)
        } else {
            self.items(items, 1.0)
        }
    }

    fn finish(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }
}

fn profit_or_loss(report: &StructuredReport, currency_symbol: &str) -> Section {
    let income = &report.income_statement;
    let mut rows = Rows::new(currency_symbol);

    rows.label(RowStyle::Heading, "Revenue")
        .items(&income.revenue_items, 1.0)
        .amount(RowStyle::Subtotal, "Total Revenue", income.total_revenue)
        .label(RowStyle::Heading, "Cost of Sales");
    if income.cost_of_sales_items.is_empty() {
        rows.amount(RowStyle::Item, "Cost of Sales", 0.0);
    } else {
        rows.items(&income.cost_of_sales_items, -1.0).amount(
            RowStyle::Subtotal,
            "Total Cost of Sales",
            -income.total_cost_of_sales,
        );
    }
    rows.amount(RowStyle::Subtotal, "Gross Profit", income.gross_profit)
        .label(RowStyle::Heading, "Operating Expenses")
        .items(&income.operating_expenses, -1.0)
        .amount(
            RowStyle::Subtotal,
            "Total Operating Expenses",
            -income.total_operating_expenses,
        )
        .amount(RowStyle::Subtotal, "Operating Profit", income.operating_profit)
        .amount(RowStyle::Item, "Taxation", -income.taxation)
        .amount(RowStyle::Total, "Profit for the year", income.net_profit);

    Section::Statement {
        title: "Statement of Profit or Loss".to_string(),
        subtitle: Some("And Other Comprehensive Income".to_string()),
        groups: vec![RowGroup {
            heading: None,
            rows: rows.finish(),
        }],
    }
}

fn financial_position(report: &StructuredReport, currency_symbol: &str) -> Section {
    let balance = &report.balance_sheet;

    let assets = Rows::new(currency_symbol)
        .label(RowStyle::SubHeading, "Non-Current Assets")
        .items_or(&balance.non_current_assets, "No non-current assets")
        .label(RowStyle::SubHeading, "Current Assets")
        .items_or(&balance.current_assets, "No current assets")
        .amount(RowStyle::Total, "Total Assets", balance.total_assets)
        .finish();

    let equity_and_liabilities = Rows::new(currency_symbol)
        .label(RowStyle::SubHeading, "Equity")
        .items(&balance.equity_items, 1.0)
        .amount(RowStyle::Subtotal, "Total Equity", balance.total_equity)
        .label(RowStyle::SubHeading, "Current Liabilities")
        .items_or(&balance.current_liabilities, "No current liabilities")
        .label(RowStyle::SubHeading, "Non-Current Liabilities")
        .items_or(&balance.non_current_liabilities, "No non-current liabilities")
        .amount(
            RowStyle::Subtotal,
            "Total Liabilities",
            balance.total_liabilities,
        )
        .amount(
            RowStyle::Total,
            "Total Equity & Liabilities",
            balance.total_equity_and_liabilities(),
        )
        .finish();

    Section::Statement {
        title: "Statement of Financial Position".to_string(),
        subtitle: None,
        groups: vec![
            RowGroup {
                heading: Some("Assets".to_string()),
                rows: assets,
            },
            RowGroup {
                heading: Some("Equity & Liabilities".to_string()),
                rows: equity_and_liabilities,
            },
        ],
    }
}

/// Build the document tree. Pure: the same report always yields the same tree.
pub fn render_document(report: &StructuredReport, currency_symbol: &str) -> Document {
    let opinion = if report.auditor_opinion.trim().is_empty() {
        NO_OPINION.to_string()
    } else {
        report.auditor_opinion.clone()
    };

    Document {
        letterhead: Letterhead {
            company: report.company_name.clone(),
            title: REPORT_TITLE.to_string(),
            period: format!("For the period ended {}", report.statement_date),
        },
        sections: vec![
            Section::Opinion {
                title: "Independent Auditor's Report".to_string(),
                text: opinion,
            },
            profit_or_loss(report, currency_symbol),
            financial_position(report, currency_symbol),
            Section::Notes {
                title: "Notes to the Financial Statements".to_string(),
                notes: report.notes_to_accounts.clone(),
            },
        ],
        footer: Footer {
            sign_off: "Signed on behalf of the Board of Directors by:".to_string(),
            signatories: vec!["Director".to_string(), "Director".to_string()],
            generated_by: format!(
                "Generated by ledgerbook on {}",
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
        },
    }
}

/// `Financial_Statements_<statement date>` with whitespace replaced by `_`
pub fn export_stem(statement_date: &str) -> String {
    let date: String = statement_date
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Financial_Statements_{date}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::fixtures::acme_report;

    fn statement_rows(doc: &Document, index: usize) -> Vec<(String, RowStyle, String)> {
        match &doc.sections[index] {
            Section::Statement { groups, .. } => groups
                .iter()
                .flat_map(|g| g.rows.iter())
                .map(|r| (r.label.clone(), r.style, r.display.clone()))
                .collect(),
            other => panic!("expected a statement, got {other:?}"),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = acme_report();
        assert_eq!(render_document(&report, "₦"), render_document(&report, "₦"));
    }

    #[test]
    fn section_order() {
        let doc = render_document(&acme_report(), "₦");
        assert!(matches!(doc.sections[0], Section::Opinion { .. }));
        assert!(matches!(doc.sections[3], Section::Notes { .. }));
        assert_eq!(doc.letterhead.period, "For the period ended 31 October 2023");
    }

    #[test]
    fn profit_or_loss_puts_items_before_subtotals() {
        let doc = render_document(&acme_report(), "₦");
        let labels: Vec<String> = statement_rows(&doc, 1).into_iter().map(|r| r.0).collect();
        assert_eq!(
            labels,
            [
                "Revenue",
                "Consulting Revenue",
                "Total Revenue",
                "Cost of Sales",
                "Cost of Sales",
                "Gross Profit",
                "Operating Expenses",
                "Rent",
                "Total Operating Expenses",
                "Operating Profit",
                "Taxation",
                "Profit for the year",
            ]
        );
    }

    #[test]
    fn cost_of_sales_items_get_their_subtotal() {
        let mut report = acme_report();
        report.income_statement.cost_of_sales_items = vec![LineItem {
            description: "Materials".to_string(),
            amount: 50000.0,
        }];
        report.income_statement.total_cost_of_sales = 50000.0;
        report.income_statement.gross_profit = 400000.0;

        let rows = statement_rows(&render_document(&report, "₦"), 1);
        let start = rows.iter().position(|r| r.0 == "Materials").unwrap();
        assert_eq!(
            rows[start..start + 3],
            [
                ("Materials".to_string(), RowStyle::Item, "(₦50,000.00)".to_string()),
                (
                    "Total Cost of Sales".to_string(),
                    RowStyle::Subtotal,
                    "(₦50,000.00)".to_string()
                ),
                ("Gross Profit".to_string(), RowStyle::Subtotal, "₦400,000.00".to_string()),
            ]
        );
    }

    #[test]
    fn only_net_profit_is_a_grand_total() {
        let rows = statement_rows(&render_document(&acme_report(), "₦"), 1);
        let totals: Vec<&str> = rows
            .iter()
            .filter(|r| r.1 == RowStyle::Total)
            .map(|r| r.0.as_str())
            .collect();
        assert_eq!(totals, ["Profit for the year"]);
    }

    #[test]
    fn liabilities_are_split_by_maturity() {
        let mut report = acme_report();
        report.balance_sheet.non_current_liabilities = vec![LineItem {
            description: "Bank Loan".to_string(),
            amount: 80000.0,
        }];
        let doc = render_document(&report, "₦");
        let Section::Statement { groups, .. } = &doc.sections[2] else {
            panic!("expected the financial position statement");
        };
        let labels: Vec<(&str, RowStyle)> = groups[1]
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.style))
            .collect();
        assert_eq!(
            labels[3..8],
            [
                ("Current Liabilities", RowStyle::SubHeading),
                ("Tax Payable", RowStyle::Item),
                ("Non-Current Liabilities", RowStyle::SubHeading),
                ("Bank Loan", RowStyle::Item),
                ("Total Liabilities", RowStyle::Subtotal),
            ]
        );

        report.balance_sheet.current_liabilities.clear();
        report.balance_sheet.non_current_liabilities.clear();
        let rows = statement_rows(&render_document(&report, "₦"), 2);
        assert!(rows.iter().any(|r| r.0 == "No current liabilities"));
        assert!(rows.iter().any(|r| r.0 == "No non-current liabilities"));
    }

    #[test]
    fn deductions_are_negated() {
        let doc = render_document(&acme_report(), "₦");
        let rows = statement_rows(&doc, 1);
        let rent = rows.iter().find(|r| r.0 == "Rent").unwrap();
        assert_eq!(rent.2, "(₦120,000.00)");
        let net = rows.last().unwrap();
        assert_eq!(net.1, RowStyle::Total);
        assert_eq!(net.2, "₦231,000.00");
    }

    #[test]
    fn financial_position_uses_provided_totals() {
        let mut report = acme_report();
        report.balance_sheet.total_assets = 1.0;
        let doc = render_document(&report, "₦");
        let rows = statement_rows(&doc, 2);

        let placeholder = &rows[1];
        assert_eq!(placeholder.0, "No non-current assets");
        assert_eq!(placeholder.1, RowStyle::Placeholder);

        let total_assets = rows.iter().find(|r| r.0 == "Total Assets").unwrap();
        assert_eq!(total_assets.2, "₦1.00");
        let total = rows.last().unwrap();
        assert_eq!(total.0, "Total Equity & Liabilities");
        assert_eq!(total.2, "₦330,000.00");
    }

    #[test]
    fn empty_opinion_gets_placeholder_text() {
        let mut report = acme_report();
        report.auditor_opinion = "  ".to_string();
        let doc = render_document(&report, "₦");
        match &doc.sections[0] {
            Section::Opinion { text, .. } => assert_eq!(text, NO_OPINION),
            other => panic!("expected opinion, got {other:?}"),
        }
    }

    #[test]
    fn export_stem_replaces_whitespace() {
        assert_eq!(
            export_stem("31 October 2023"),
            "Financial_Statements_31_October_2023"
        );
        assert_eq!(export_stem("2023-10-31"), "Financial_Statements_2023-10-31");
    }
}
