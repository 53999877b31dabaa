//! User-facing messages, localized for the redemption page.

pub const INVALID_JSON_BODY: &str = "请求体不是合法 JSON";
pub const MISSING_KEY: &str = "缺少 key_id（卡密）字段";
pub const GENERIC_FAILURE: &str = "激活/查询失败，请检查卡密是否正确";
