//! Who may see a single prayer request

use uuid::Uuid;

use crate::domain::entities::{PrayerRequest, PrayerStatus, Visibility};

/// Decide whether `viewer` may see `request`.
///
/// `member_of_attached_group` is whether the viewer holds an active
/// membership in at least one group the request is attached to.
pub fn is_visible_to(
    request: &PrayerRequest,
    viewer: Option<Uuid>,
    member_of_attached_group: bool,
) -> bool {
    if request.is_deleted() {
        return false;
    }

    if viewer == Some(request.author_id) {
        return true;
    }

    if request.status != PrayerStatus::Active {
        return false;
    }

    match request.visibility {
        Visibility::Public => true,
        Visibility::GroupOnly => viewer.is_some() && member_of_attached_group,
        Visibility::Private => false,
    }
}
