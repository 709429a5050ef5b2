//! Built-in industry templates.

use tenantry_fields::{
    DefaultView, EntityTypeDef, FieldDef, FieldType, PipelineStage, SelectOption,
    ValidationRules,
};

use crate::types::{NavigationItem, WorkspaceTemplate};

pub const REAL_ESTATE: &str = "real-estate";
pub const HEALTHCARE: &str = "healthcare";
pub const LEGAL: &str = "legal";
pub const MORTGAGE: &str = "mortgage";

/// Real estate, healthcare, legal and mortgage, in that order.
pub fn built_in_templates() -> Vec<WorkspaceTemplate> {
    vec![real_estate(), healthcare(), legal(), mortgage()]
}

fn overview() -> NavigationItem {
    NavigationItem::page("overview", "Overview", "layout-dashboard", "/", 1)
}

fn select(name: &str, label: &str, options: &[(&str, &str)]) -> FieldDef {
    FieldDef::new(name, label, FieldType::Select).options(
        options
            .iter()
            .map(|(value, label)| SelectOption::new(*value, *label)),
    )
}

fn non_negative() -> ValidationRules {
    ValidationRules::default().min(0.0)
}

// =========================================================================
// Real estate
// =========================================================================

pub fn real_estate() -> WorkspaceTemplate {
    WorkspaceTemplate {
        id: REAL_ESTATE.into(),
        name: "Real Estate".into(),
        description: "Listings, buyers and showings for brokerages".into(),
        industry: "real-estate".into(),
        icon: "home".into(),
        navigation: vec![
            overview(),
            NavigationItem::entity("properties", "Properties", "home", "property", 2),
            NavigationItem::entity("clients", "Clients", "users", "client", 3),
            NavigationItem::entity("showings", "Showings", "calendar", "showing", 4),
        ],
        entity_types: vec![property(), client(), showing()],
    }
}

fn property() -> EntityTypeDef {
    EntityTypeDef::new("property", "Property", "Properties", "home")
        .field(FieldDef::new("address", "Address", FieldType::Address).required())
        .field(
            FieldDef::new("price", "Price", FieldType::Currency)
                .required()
                .validation(non_negative()),
        )
        .field(
            FieldDef::new("bedrooms", "Bedrooms", FieldType::Number)
                .validation(ValidationRules::range(0.0, 20.0)),
        )
        .field(
            FieldDef::new("bathrooms", "Bathrooms", FieldType::Number)
                .validation(ValidationRules::range(0.0, 20.0)),
        )
        .field(
            FieldDef::new("square_feet", "Square Feet", FieldType::Number)
                .validation(non_negative()),
        )
        .field(
            select(
                "status",
                "Status",
                &[
                    ("available", "Available"),
                    ("under-contract", "Under Contract"),
                    ("sold", "Sold"),
                    ("off-market", "Off Market"),
                ],
            )
            .default_value("available"),
        )
        .field(FieldDef::new("listing_date", "Listing Date", FieldType::Date))
        .field(FieldDef::new("photos", "Photos", FieldType::Image))
        .field(
            FieldDef::new("price_per_sqft", "Price per Sq Ft", FieldType::Formula)
                .formula("Math.round({price} / {square_feet})"),
        )
        .searchable(&["address"])
        .summary(&["address", "price", "status"])
        .view(DefaultView::Gallery)
        .collaborative()
}

fn client() -> EntityTypeDef {
    EntityTypeDef::new("client", "Client", "Clients", "users")
        .field(FieldDef::new("name", "Name", FieldType::Text).required())
        .field(FieldDef::new("email", "Email", FieldType::Email))
        .field(FieldDef::new("phone", "Phone", FieldType::Phone))
        .field(select(
            "client_type",
            "Client Type",
            &[("buyer", "Buyer"), ("seller", "Seller"), ("both", "Buyer & Seller")],
        ))
        .field(FieldDef::new("budget", "Budget", FieldType::Currency).validation(non_negative()))
        .searchable(&["name", "email"])
        .summary(&["name", "client_type"])
}

fn showing() -> EntityTypeDef {
    EntityTypeDef::new("showing", "Showing", "Showings", "calendar")
        .field(
            FieldDef::new("property", "Property", FieldType::EntityReference)
                .required()
                .references("property"),
        )
        .field(FieldDef::new("client", "Client", FieldType::EntityReference).references("client"))
        .field(FieldDef::new("scheduled_at", "Scheduled At", FieldType::Datetime).required())
        .field(FieldDef::new("feedback", "Feedback", FieldType::Richtext))
        .field(
            FieldDef::new("interest", "Interest", FieldType::Rating)
                .validation(ValidationRules::range(1.0, 5.0)),
        )
        .summary(&["property", "scheduled_at"])
        .view(DefaultView::Calendar)
}

// =========================================================================
// Healthcare
// =========================================================================

pub fn healthcare() -> WorkspaceTemplate {
    WorkspaceTemplate {
        id: HEALTHCARE.into(),
        name: "Healthcare".into(),
        description: "Patients and appointments for clinics".into(),
        industry: "healthcare".into(),
        icon: "heart-pulse".into(),
        navigation: vec![
            overview(),
            NavigationItem::entity("patients", "Patients", "user-round", "patient", 2),
            NavigationItem::entity("appointments", "Appointments", "calendar", "appointment", 3),
        ],
        entity_types: vec![patient(), appointment()],
    }
}

fn patient() -> EntityTypeDef {
    EntityTypeDef::new("patient", "Patient", "Patients", "user-round")
        .field(FieldDef::new("first_name", "First Name", FieldType::Text).required())
        .field(FieldDef::new("last_name", "Last Name", FieldType::Text).required())
        .field(FieldDef::new("date_of_birth", "Date of Birth", FieldType::Date).required())
        .field(FieldDef::new("email", "Email", FieldType::Email))
        .field(FieldDef::new("phone", "Phone", FieldType::Phone))
        .field(FieldDef::new("insurance_provider", "Insurance Provider", FieldType::Text))
        .field(select(
            "blood_type",
            "Blood Type",
            &[
                ("a+", "A+"),
                ("a-", "A-"),
                ("b+", "B+"),
                ("b-", "B-"),
                ("ab+", "AB+"),
                ("ab-", "AB-"),
                ("o+", "O+"),
                ("o-", "O-"),
            ],
        ))
        .field(FieldDef::new("allergies", "Allergies", FieldType::Richtext))
        .searchable(&["first_name", "last_name", "email"])
        .summary(&["first_name", "last_name", "date_of_birth"])
        .collaborative()
}

fn appointment() -> EntityTypeDef {
    EntityTypeDef::new("appointment", "Appointment", "Appointments", "calendar")
        .field(
            FieldDef::new("patient", "Patient", FieldType::EntityReference)
                .required()
                .references("patient"),
        )
        .field(FieldDef::new("scheduled_at", "Scheduled At", FieldType::Datetime).required())
        .field(
            FieldDef::new("duration_minutes", "Duration (minutes)", FieldType::Number)
                .default_value(30)
                .validation(
                    ValidationRules::range(5.0, 480.0)
                        .message("Appointments last between 5 minutes and 8 hours"),
                ),
        )
        .field(select(
            "visit_type",
            "Visit Type",
            &[
                ("consultation", "Consultation"),
                ("follow-up", "Follow-up"),
                ("procedure", "Procedure"),
                ("telehealth", "Telehealth"),
            ],
        ))
        .field(
            select(
                "status",
                "Status",
                &[
                    ("scheduled", "Scheduled"),
                    ("checked-in", "Checked In"),
                    ("completed", "Completed"),
                    ("cancelled", "Cancelled"),
                    ("no-show", "No Show"),
                ],
            )
            .default_value("scheduled"),
        )
        .field(FieldDef::new("provider", "Provider", FieldType::UserReference))
        .summary(&["patient", "scheduled_at", "status"])
        .view(DefaultView::Calendar)
}

// =========================================================================
// Legal
// =========================================================================

pub fn legal() -> WorkspaceTemplate {
    WorkspaceTemplate {
        id: LEGAL.into(),
        name: "Legal".into(),
        description: "Matters, clients and billable time for law firms".into(),
        industry: "legal".into(),
        icon: "scale".into(),
        navigation: vec![
            overview(),
            NavigationItem::entity("matters", "Matters", "briefcase", "matter", 2),
            NavigationItem::entity("legal-clients", "Clients", "users", "legal_client", 3),
        ],
        entity_types: vec![matter(), legal_client()],
    }
}

fn matter() -> EntityTypeDef {
    EntityTypeDef::new("matter", "Matter", "Matters", "briefcase")
        .field(FieldDef::new("title", "Title", FieldType::Text).required())
        .field(
            FieldDef::new("client", "Client", FieldType::EntityReference)
                .required()
                .references("legal_client"),
        )
        .field(select(
            "practice_area",
            "Practice Area",
            &[
                ("corporate", "Corporate"),
                ("litigation", "Litigation"),
                ("family", "Family"),
                ("real-estate", "Real Estate"),
                ("ip", "Intellectual Property"),
            ],
        ))
        .field(FieldDef::new("opened_date", "Opened", FieldType::Date))
        .field(
            FieldDef::new("billable_hours", "Billable Hours", FieldType::Number)
                .default_value(0)
                .validation(non_negative()),
        )
        .field(
            FieldDef::new("hourly_rate", "Hourly Rate", FieldType::Currency)
                .validation(non_negative()),
        )
        .field(
            FieldDef::new("total_billed", "Total Billed", FieldType::Formula)
                .formula("{billable_hours} * {hourly_rate}"),
        )
        .searchable(&["title"])
        .summary(&["title", "client", "practice_area"])
        .view(DefaultView::Kanban)
        .pipeline([
            PipelineStage::new("intake", "Intake", "gray", 1),
            PipelineStage::new("active", "Active", "blue", 2),
            PipelineStage::new("discovery", "Discovery", "yellow", 3),
            PipelineStage::new("trial", "Trial", "orange", 4),
            PipelineStage::new("closed", "Closed", "green", 5),
        ])
        .collaborative()
}

fn legal_client() -> EntityTypeDef {
    EntityTypeDef::new("legal_client", "Client", "Clients", "users")
        .field(FieldDef::new("name", "Name", FieldType::Text).required())
        .field(FieldDef::new("email", "Email", FieldType::Email))
        .field(FieldDef::new("phone", "Phone", FieldType::Phone))
        .field(select(
            "client_type",
            "Client Type",
            &[("individual", "Individual"), ("organization", "Organization")],
        ))
        .field(FieldDef::new("conflict_checked", "Conflict Checked", FieldType::Boolean).default_value(false))
        .searchable(&["name", "email"])
        .summary(&["name", "client_type"])
}

// =========================================================================
// Mortgage
// =========================================================================

pub fn mortgage() -> WorkspaceTemplate {
    WorkspaceTemplate {
        id: MORTGAGE.into(),
        name: "Mortgage".into(),
        description: "Loan applications from intake to funding".into(),
        industry: "mortgage".into(),
        icon: "landmark".into(),
        navigation: vec![
            overview(),
            NavigationItem::entity("applications", "Applications", "file-text", "application", 2),
        ],
        entity_types: vec![application()],
    }
}

/// Six stages from intake to funding.
fn funding_pipeline() -> Vec<PipelineStage> {
    vec![
        PipelineStage::new("application", "Application", "gray", 1).probability(10),
        PipelineStage::new("processing", "Processing", "blue", 2).probability(25),
        PipelineStage::new("underwriting", "Underwriting", "yellow", 3).probability(50),
        PipelineStage::new("approved", "Approved", "orange", 4).probability(75),
        PipelineStage::new("closing", "Closing", "purple", 5).probability(90),
        PipelineStage::new("funded", "Funded", "green", 6).probability(100),
    ]
}

fn application() -> EntityTypeDef {
    EntityTypeDef::new("application", "Application", "Applications", "file-text")
        .field(FieldDef::new("borrower_name", "Borrower Name", FieldType::Text).required())
        .field(FieldDef::new("borrower_email", "Borrower Email", FieldType::Email).required())
        .field(FieldDef::new("borrower_phone", "Borrower Phone", FieldType::Phone))
        .field(
            FieldDef::new("loan_amount", "Loan Amount", FieldType::Currency)
                .required()
                .validation(ValidationRules::default().min(1.0)),
        )
        .field(
            FieldDef::new("property_value", "Property Value", FieldType::Currency)
                .validation(non_negative()),
        )
        .field(select(
            "loan_type",
            "Loan Type",
            &[
                ("conventional", "Conventional"),
                ("fha", "FHA"),
                ("va", "VA"),
                ("jumbo", "Jumbo"),
            ],
        ))
        .field(
            FieldDef::new("interest_rate", "Interest Rate", FieldType::Percentage)
                .validation(ValidationRules::range(0.0, 25.0)),
        )
        .field(
            FieldDef::new("credit_score", "Credit Score", FieldType::Number)
                .validation(ValidationRules::range(300.0, 850.0)),
        )
        .field(
            FieldDef::new("loan_to_value", "Loan to Value", FieldType::Formula)
                .formula("Math.round({loan_amount} / {property_value} * 100)"),
        )
        .searchable(&["borrower_name", "borrower_email"])
        .summary(&["borrower_name", "loan_amount", "loan_type"])
        .view(DefaultView::Kanban)
        .pipeline(funding_pipeline())
        .collaborative()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_template_ids() {
        let ids: Vec<String> = built_in_templates().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, [REAL_ESTATE, HEALTHCARE, LEGAL, MORTGAGE]);
    }

    #[test]
    fn test_every_template_passes_check() {
        for template in built_in_templates() {
            template
                .check()
                .unwrap_or_else(|e| panic!("{} failed check: {e}", template.id));
        }
    }

    #[test]
    fn test_property_fields() {
        let property = property();
        assert_eq!(property.default_view, DefaultView::Gallery);
        let price = property.get_field("price").unwrap();
        assert_eq!(price.field_type, FieldType::Currency);
        assert!(price.required);
        let bedrooms = property.get_field("bedrooms").unwrap();
        assert_eq!(bedrooms.validation, Some(ValidationRules::range(0.0, 20.0)));
        for name in ["address", "bathrooms", "square_feet", "status", "listing_date"] {
            assert!(property.get_field(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_mortgage_pipeline_has_six_stages() {
        let application = application();
        assert!(application.enable_pipeline);
        assert_eq!(application.pipeline_stages.len(), 6);
        assert_eq!(application.pipeline_stages[5].id, "funded");
    }

    #[test]
    fn test_navigation_targets_exist() {
        for template in built_in_templates() {
            for item in &template.navigation {
                if let Some(name) = &item.entity_type {
                    assert!(
                        template.entity_types.iter().any(|et| &et.name == name),
                        "{}: nav item {} points at missing {name}",
                        template.id,
                        item.id
                    );
                }
            }
        }
    }
}
