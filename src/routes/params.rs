use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    entity::{contacts::ContactStatus, enquiries::EnquiryStatus},
    lifecycle::QuoteStatus,
};

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

// Query strings are decoded by serde_urlencoded, which cannot parse numbers
// through `#[serde(flatten)]`, so paging fields are repeated per query type.

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<QuoteStatus>,
    /// Matches tracking code, requester name, or either city.
    pub q: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl QuoteListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnquiryListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<EnquiryStatus>,
}

impl EnquiryListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<ContactStatus>,
}

impl ContactListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
