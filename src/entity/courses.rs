use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub educator_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub domain: String,
    pub price: i64,
    pub discount: i32,
    pub is_published: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub content: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::EducatorId",
        to = "super::users::Column::Id"
    )]
    Educator,
    #[sea_orm(has_many = "super::course_ratings::Entity")]
    CourseRatings,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Educator.def()
    }
}

impl Related<super::course_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseRatings.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
