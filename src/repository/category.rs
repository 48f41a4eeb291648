use diesel::prelude::*;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, CategoryName};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryResult,
};

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .find(id.get())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }

    fn find_categories_by_names(&self, names: &[CategoryName]) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        if names.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn()?;
        let names = names.iter().map(CategoryName::as_str).collect::<Vec<_>>();

        let items = categories::table
            .filter(categories::name.eq_any(names))
            .order(categories::id.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_categories(&self, categories: &[NewCategory]) -> RepositoryResult<usize> {
        use crate::schema::categories;

        if categories.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let rows = categories
            .iter()
            .cloned()
            .map(DbNewCategory::from)
            .collect::<Vec<_>>();

        let affected = diesel::insert_into(categories::table)
            .values(&rows)
            .execute(&mut conn)?;

        Ok(affected)
    }
}
