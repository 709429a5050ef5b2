//! The configuration every new workspace starts from.
//!
//! `default_configuration()` gives a CRM layout: seven navigation items and the
//! contact, deal and company entity types. Deals run through a six-stage sales
//! pipeline shown as a kanban board.

use chrono::Utc;
use tenantry_fields::{
    DefaultView, EntityTypeDef, FieldDef, FieldType, FieldWidth, PipelineStage, SelectOption,
    ValidationRules,
};

use crate::types::{NavigationItem, WorkspaceConfiguration};

/// Default navigation and entity types for `workspace_id`, at version 1.
pub fn default_configuration(workspace_id: &str) -> WorkspaceConfiguration {
    let now = Utc::now();
    WorkspaceConfiguration {
        workspace_id: workspace_id.to_string(),
        navigation: default_navigation(),
        entity_types: vec![contact(), deal(), company()],
        views: Vec::new(),
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn default_navigation() -> Vec<NavigationItem> {
    vec![
        NavigationItem::page("overview", "Overview", "layout-dashboard", "/", 1),
        NavigationItem::page("leads", "Leads", "target", "/leads", 2),
        NavigationItem::entity("contacts", "Contacts", "users", "contact", 3),
        NavigationItem::entity("companies", "Companies", "building", "company", 4),
        NavigationItem::entity("deals", "Deals", "handshake", "deal", 5),
        NavigationItem::page("products", "Products", "package", "/products", 6),
        NavigationItem::page("orders", "Orders", "shopping-cart", "/orders", 7),
    ]
}

// =========================================================================
// Entity types
// =========================================================================

pub fn contact() -> EntityTypeDef {
    EntityTypeDef::new("contact", "Contact", "Contacts", "user")
        .description("People you do business with")
        .field(
            FieldDef::new("first_name", "First Name", FieldType::Text)
                .required()
                .width(FieldWidth::Half),
        )
        .field(
            FieldDef::new("last_name", "Last Name", FieldType::Text)
                .required()
                .width(FieldWidth::Half),
        )
        .field(FieldDef::new("email", "Email", FieldType::Email).required())
        .field(FieldDef::new("phone", "Phone", FieldType::Phone))
        .field(FieldDef::new("company", "Company", FieldType::EntityReference).references("company"))
        .field(FieldDef::new("job_title", "Job Title", FieldType::Text))
        .field(
            FieldDef::new("lead_source", "Lead Source", FieldType::Select).options([
                SelectOption::new("website", "Website"),
                SelectOption::new("referral", "Referral"),
                SelectOption::new("event", "Event"),
                SelectOption::new("cold-outreach", "Cold Outreach"),
                SelectOption::new("other", "Other"),
            ]),
        )
        .field(
            FieldDef::new("tags", "Tags", FieldType::Multiselect).options([
                SelectOption::new("customer", "Customer").color("green"),
                SelectOption::new("prospect", "Prospect").color("blue"),
                SelectOption::new("partner", "Partner").color("purple"),
            ]),
        )
        .field(
            FieldDef::new("full_name", "Full Name", FieldType::Formula)
                .formula(r#"CONCAT({first_name}, " ", {last_name})"#),
        )
        .field(FieldDef::new("notes", "Notes", FieldType::Richtext))
        .searchable(&["first_name", "last_name", "email", "phone"])
        .summary(&["full_name", "email", "company"])
        .collaborative()
}

/// The default sales pipeline. Closed-lost carries probability 0.
pub fn sales_pipeline() -> Vec<PipelineStage> {
    vec![
        PipelineStage::new("prospecting", "Prospecting", "gray", 1).probability(10),
        PipelineStage::new("qualification", "Qualification", "blue", 2).probability(25),
        PipelineStage::new("proposal", "Proposal", "yellow", 3).probability(50),
        PipelineStage::new("negotiation", "Negotiation", "orange", 4).probability(75),
        PipelineStage::new("closed-won", "Closed Won", "green", 5).probability(100),
        PipelineStage::new("closed-lost", "Closed Lost", "red", 6).probability(0),
    ]
}

pub fn deal() -> EntityTypeDef {
    EntityTypeDef::new("deal", "Deal", "Deals", "handshake")
        .description("Sales opportunities")
        .field(FieldDef::new("name", "Deal Name", FieldType::Text).required())
        .field(
            FieldDef::new("amount", "Amount", FieldType::Currency)
                .validation(ValidationRules::default().min(0.0)),
        )
        .field(FieldDef::new("contact", "Contact", FieldType::EntityReference).references("contact"))
        .field(FieldDef::new("company", "Company", FieldType::EntityReference).references("company"))
        .field(FieldDef::new("close_date", "Expected Close", FieldType::Date))
        .field(FieldDef::new("owner", "Owner", FieldType::UserReference))
        .field(
            FieldDef::new("probability", "Probability", FieldType::Percentage)
                .validation(ValidationRules::range(0.0, 100.0)),
        )
        .field(
            FieldDef::new("weighted_amount", "Weighted Amount", FieldType::Formula)
                .formula("{amount} * {probability} / 100"),
        )
        .searchable(&["name"])
        .summary(&["name", "amount", "close_date"])
        .view(DefaultView::Kanban)
        .pipeline(sales_pipeline())
        .collaborative()
}

pub fn company() -> EntityTypeDef {
    EntityTypeDef::new("company", "Company", "Companies", "building")
        .description("Organizations you work with")
        .field(FieldDef::new("name", "Company Name", FieldType::Text).required())
        .field(FieldDef::new("website", "Website", FieldType::Url))
        .field(
            FieldDef::new("industry", "Industry", FieldType::Select).options([
                SelectOption::new("technology", "Technology"),
                SelectOption::new("finance", "Finance"),
                SelectOption::new("healthcare", "Healthcare"),
                SelectOption::new("retail", "Retail"),
                SelectOption::new("manufacturing", "Manufacturing"),
                SelectOption::new("other", "Other"),
            ]),
        )
        .field(
            FieldDef::new("employees", "Employees", FieldType::Number)
                .validation(ValidationRules::default().min(0.0)),
        )
        .field(FieldDef::new("annual_revenue", "Annual Revenue", FieldType::Currency))
        .field(FieldDef::new("phone", "Phone", FieldType::Phone))
        .field(FieldDef::new("address", "Address", FieldType::Address))
        .searchable(&["name", "website"])
        .summary(&["name", "industry"])
}
