// server/src/seed.rs

//! Demo data for a fresh database: two accounts, four categories and six products.

use souq::auth::password::hash_password;
use souq::models::{NewCategory, NewProduct, NewUser};
use souq::SouqResult;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::state::AppState;

struct DemoProduct {
  title: &'static str,
  description: &'static str,
  price: f64,
  discount_price: Option<f64>,
  image_url: &'static str,
  file_url: &'static str,
  category_slug: &'static str,
  featured: bool,
  popular: bool,
}

const CATEGORIES: [(&str, &str); 4] = [
  ("كتب إلكترونية", "ebooks"),
  ("دورات برمجية", "programming-courses"),
  ("قوالب ومستندات", "templates"),
  ("موارد تصميمية", "design-resources"),
];

const PRODUCTS: [DemoProduct; 6] = [
  DemoProduct {
    title: "تعلم تطوير الويب",
    description: "دليل شامل لتعلم تطوير مواقع الويب من الصفر إلى الاحتراف.",
    price: 29.99,
    discount_price: None,
    image_url: "https://images.unsplash.com/photo-1516116216624-53e697fedbea?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/web-development-guide.pdf",
    category_slug: "ebooks",
    featured: true,
    popular: false,
  },
  DemoProduct {
    title: "دليل الذكاء الاصطناعي",
    description: "كورس شامل في مجال الذكاء الاصطناعي وتطبيقاته العملية.",
    price: 49.99,
    discount_price: None,
    image_url: "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/ai-guide.zip",
    category_slug: "programming-courses",
    featured: true,
    popular: true,
  },
  DemoProduct {
    title: "قوالب عرض تقديمي",
    description: "مجموعة من قوالب العروض التقديمية الاحترافية لمختلف المجالات.",
    price: 19.99,
    discount_price: None,
    image_url: "https://images.unsplash.com/photo-1606857521015-7f9fcf423740?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/presentation-templates.zip",
    category_slug: "templates",
    featured: true,
    popular: false,
  },
  DemoProduct {
    title: "أساسيات التسويق الرقمي",
    description: "دليل شامل للتسويق الرقمي ووسائل التواصل الاجتماعي.",
    price: 24.99,
    discount_price: None,
    image_url: "https://images.unsplash.com/photo-1432888498266-38ffec3eaf0a?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/digital-marketing.pdf",
    category_slug: "ebooks",
    featured: false,
    popular: false,
  },
  DemoProduct {
    title: "برنامج اللياقة البدنية",
    description: "برنامج تدريبي متكامل للياقة البدنية يناسب جميع المستويات.",
    price: 34.99,
    discount_price: None,
    image_url: "https://images.unsplash.com/photo-1594882645126-14020914d58d?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/fitness-program.pdf",
    category_slug: "ebooks",
    featured: false,
    popular: false,
  },
  DemoProduct {
    title: "كتاب وصفات الطبخ",
    description: "مجموعة من ألذ وصفات الطبخ العالمية مع شرح تفصيلي للتحضير.",
    price: 24.99,
    discount_price: Some(19.99),
    image_url: "https://images.unsplash.com/photo-1476718406336-bb5a9690ee2a?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=300",
    file_url: "/downloads/recipes-book.pdf",
    category_slug: "ebooks",
    featured: false,
    popular: false,
  },
];

/// Seeds the store unless it already holds users. Returns whether anything was written.
#[instrument(name = "seed::seed_if_empty", skip_all)]
pub async fn seed_if_empty(state: &AppState) -> SouqResult<bool> {
  if state.store.has_users().await? {
    info!("Database already seeded, skipping.");
    return Ok(false);
  }

  for (username, email, password, is_admin) in [
    ("admin", "admin@example.com", "admin123", true),
    ("user", "user@example.com", "user123", false),
  ] {
    let user = state
      .store
      .insert_user(NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: hash_password(password)?,
        is_admin,
      })
      .await?;
    info!(user_id = user.id, username = %user.username, is_admin, "Seeded user.");
  }

  let mut category_ids = HashMap::new();
  for (name, slug) in CATEGORIES {
    let category = state
      .catalog
      .create_category(NewCategory {
        name: name.to_string(),
        slug: slug.to_string(),
      })
      .await?;
    category_ids.insert(slug, category.id);
  }

  for demo in &PRODUCTS {
    let product = state
      .catalog
      .create_product(NewProduct {
        title: demo.title.to_string(),
        description: demo.description.to_string(),
        price: demo.price,
        image_url: demo.image_url.to_string(),
        file_url: demo.file_url.to_string(),
        category_id: category_ids.get(demo.category_slug).copied(),
        featured: demo.featured,
        popular: demo.popular,
        discount_price: demo.discount_price,
        active: true,
      })
      .await?;
    debug!(product_id = product.id, "Seeded product.");
  }

  info!(
    categories = CATEGORIES.len(),
    products = PRODUCTS.len(),
    "Database seeding completed successfully."
  );
  Ok(true)
}
