use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{DashboardSummary, UpdateRoleRequest, UserList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        feedback::SubmitFeedbackRequest,
        messages::{
            ContactList, CreateContactRequest, CreateEnquiryRequest, EnquiryList,
            UpdateContactStatusRequest, UpdateEnquiryStatusRequest,
        },
        quotes::{AdminQuoteUpdate, CreateQuoteRequest, PaymentResult, QuoteDetail, QuoteList, TrackedQuote},
    },
    entity::{contacts::ContactStatus, enquiries::EnquiryStatus, users::Role},
    lifecycle::{
        QuoteStatus, TrackingView,
        tracking::{Banner, ProgressStep, QuoteActions, StepState},
    },
    models::{Contact, Enquiry, Feedback, ItemCounts, PublicQuote, Quote, User},
    payment::{
        PaymentMethod, PaymentReceipt, PaymentStatus,
        details::{CardDetails, NetBankingDetails, PaymentDetails, UpiDetails},
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, feedback, health, messages, params, quotes, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        quotes::create_quote,
        quotes::track_quote,
        quotes::update_quote,
        quotes::delete_quote,
        quotes::capture_payment,
        users::list_my_quotes,
        users::get_my_quote,
        users::accept_quote,
        users::cancel_quote,
        feedback::submit_feedback,
        feedback::get_feedback,
        messages::create_enquiry,
        messages::create_contact,
        admin::dashboard,
        admin::list_all_quotes,
        admin::get_quote_admin,
        admin::list_users,
        admin::update_user_role,
        admin::delete_user,
        admin::list_enquiries,
        admin::update_enquiry_status,
        admin::delete_enquiry,
        admin::list_contacts,
        admin::update_contact_status,
        admin::delete_contact
    ),
    components(
        schemas(
            User,
            Role,
            Quote,
            PublicQuote,
            QuoteStatus,
            ItemCounts,
            Feedback,
            Enquiry,
            EnquiryStatus,
            Contact,
            ContactStatus,
            TrackingView,
            ProgressStep,
            StepState,
            Banner,
            QuoteActions,
            PaymentDetails,
            CardDetails,
            UpiDetails,
            NetBankingDetails,
            PaymentMethod,
            PaymentStatus,
            PaymentReceipt,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateQuoteRequest,
            AdminQuoteUpdate,
            SubmitFeedbackRequest,
            CreateEnquiryRequest,
            CreateContactRequest,
            UpdateEnquiryStatusRequest,
            UpdateContactStatusRequest,
            UpdateRoleRequest,
            QuoteList,
            TrackedQuote,
            QuoteDetail,
            PaymentResult,
            EnquiryList,
            ContactList,
            UserList,
            DashboardSummary,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Quote>,
            ApiResponse<QuoteList>,
            ApiResponse<QuoteDetail>,
            ApiResponse<DashboardSummary>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Quotes", description = "Quote requests, public tracking, admin edits and payment"),
        (name = "My Quotes", description = "Quotes owned by the signed-in user"),
        (name = "Feedback", description = "Ratings for completed moves"),
        (name = "Support", description = "Public enquiry and contact forms"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
