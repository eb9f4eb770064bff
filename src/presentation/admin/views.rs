use askama::Template;

use crate::application::editor::ToolbarButton;
use crate::presentation::views::LayoutContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct BannerView {
    pub kind: BannerKind,
    pub message: String,
}

impl BannerView {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            BannerKind::Success => "banner banner--success",
            BannerKind::Error => "banner banner--error",
        }
    }

    pub fn role(&self) -> &'static str {
        match self.kind {
            BannerKind::Success => "status",
            BannerKind::Error => "alert",
        }
    }
}

/// Values currently in the create/edit form.
#[derive(Clone, Debug, Default)]
pub struct AdminFormView {
    pub editing_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub form_token: String,
}

impl AdminFormView {
    pub fn action(&self) -> String {
        match self.editing_id {
            Some(id) => format!("/admin/posts/{id}"),
            None => "/admin/posts".to_string(),
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit Post"
        } else {
            "Create New Post"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Update Post"
        } else {
            "Publish Post"
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AdminPostRowView {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub date_display: String,
    pub view_href: String,
    pub edit_href: String,
    pub delete_href: String,
}

pub struct AdminPageView {
    pub form: AdminFormView,
    pub posts: Vec<AdminPostRowView>,
    pub banner: Option<BannerView>,
    pub toolbar: Vec<ToolbarButton>,
    pub operator: String,
    pub upload_limit_label: String,
}

impl AdminPageView {
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub view: LayoutContext<AdminPageView>,
}

pub struct AdminDeleteView {
    pub id: i64,
    pub title: String,
    pub form_token: String,
    pub banner: Option<BannerView>,
}

impl AdminDeleteView {
    pub fn action(&self) -> String {
        format!("/admin/posts/{}/delete", self.id)
    }
}

#[derive(Template)]
#[template(path = "admin_delete.html")]
pub struct AdminDeleteTemplate {
    pub view: LayoutContext<AdminDeleteView>,
}

#[derive(Default)]
pub struct LoginView {
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginView>,
}

/// Upload limit rendered as a short human label, e.g. `10 MB`.
pub fn format_upload_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_switches_between_create_and_edit() {
        let mut form = AdminFormView::default();
        assert_eq!(form.action(), "/admin/posts");
        assert_eq!(form.submit_label(), "Publish Post");

        form.editing_id = Some(9);
        assert_eq!(form.action(), "/admin/posts/9");
        assert_eq!(form.heading(), "Edit Post");
    }

    #[test]
    fn upload_limit_label() {
        assert_eq!(format_upload_limit(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_upload_limit(1_572_864), "1536 KB");
        assert_eq!(format_upload_limit(512), "512 bytes");
    }
}
