use replyline::config::Profile;

/// A storefront page with one unanswered review (42) and one answered
/// review (43, reply 7)
#[allow(dead_code)]
pub const STOREFRONT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
<input type="hidden" name="csrfmiddlewaretoken" value="page-token">
<div class="review-card" data-review-id="42">
  <div class="review-content">
    <p class="review-text">Arrived quickly, works great.</p>
    <div class="reply-form-container">
      <button class="btn btn-sm show-reply-form-btn" data-review-id="42">Reply</button>
      <form class="reply-form" data-review-id="42" style="display: none">
        <textarea name="reply_text" class="form-control" rows="3" maxlength="1000" required></textarea>
        <button type="submit" class="btn btn-primary btn-sm">Post Reply</button>
        <button type="button" class="btn btn-secondary btn-sm cancel-reply-btn">Cancel</button>
      </form>
    </div>
  </div>
</div>
<div class="review-card" data-review-id="43">
  <div class="review-content">
    <p class="review-text">Box was damaged.</p>
    <div class="review-reply" data-reply-id="7">
      <div class="reply-content"><p>Sorry to hear that!</p></div>
      <button class="btn btn-sm edit-reply-btn" data-reply-id="7">Edit</button>
      <button class="btn btn-sm delete-reply-btn" data-reply-id="7">Delete</button>
    </div>
  </div>
</div>
</body>
</html>"#;

/// Profile pointing at a test server
#[allow(dead_code)]
pub fn profile_for(server: &str) -> Profile {
    Profile {
        server: Some(server.to_string()),
        cookie: Some("sessionid=seller-session".to_string()),
        ..Profile::blank("test")
    }
}
