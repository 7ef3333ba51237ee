//! Request extractors

mod campaign_form;

pub use campaign_form::{parse_recipient_ids, CampaignForm};
