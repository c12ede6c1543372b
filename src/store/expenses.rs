use crate::{
    error::AppError,
    models::expense::{Expense, ExpenseFields},
};

use super::{new_id, Change, Store};

impl Store {
    /// Newest first.
    pub async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, AppError> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT id, trip_id, title, amount, category, date FROM expenses WHERE trip_id = ? ORDER BY date DESC, rowid DESC",
        )
        .bind(trip_id)
        .fetch_all(self.db())
        .await?;
        Ok(expenses)
    }

    pub async fn get_expense(
        &self,
        trip_id: &str,
        expense_id: &str,
    ) -> Result<Option<Expense>, AppError> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT id, trip_id, title, amount, category, date FROM expenses WHERE trip_id = ? AND id = ?",
        )
        .bind(trip_id)
        .bind(expense_id)
        .fetch_optional(self.db())
        .await?;
        Ok(expense)
    }

    pub async fn create_expense(
        &self,
        trip_id: &str,
        fields: &ExpenseFields,
    ) -> Result<Expense, AppError> {
        let expense = Expense {
            id: new_id(),
            trip_id: trip_id.to_string(),
            title: fields.title.clone(),
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
        };
        sqlx::query(
            "INSERT INTO expenses (id, trip_id, title, amount, category, date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(&expense.trip_id)
        .bind(&expense.title)
        .bind(expense.amount)
        .bind(expense.category.as_str())
        .bind(expense.date)
        .execute(self.db())
        .await?;
        self.publish([Change::Expenses {
            trip_id: trip_id.to_string(),
        }]);
        Ok(expense)
    }

    pub async fn update_expense(
        &self,
        expense: &Expense,
        fields: &ExpenseFields,
    ) -> Result<Expense, AppError> {
        sqlx::query(
            "UPDATE expenses SET title = ?, amount = ?, category = ?, date = ? WHERE trip_id = ? AND id = ?",
        )
        .bind(&fields.title)
        .bind(fields.amount)
        .bind(fields.category.as_str())
        .bind(fields.date)
        .bind(&expense.trip_id)
        .bind(&expense.id)
        .execute(self.db())
        .await?;
        self.publish([Change::Expenses {
            trip_id: expense.trip_id.clone(),
        }]);
        Ok(Expense {
            title: fields.title.clone(),
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            ..expense.clone()
        })
    }

    pub async fn delete_expense(&self, trip_id: &str, expense_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM expenses WHERE trip_id = ? AND id = ?")
            .bind(trip_id)
            .bind(expense_id)
            .execute(self.db())
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            self.publish([Change::Expenses {
                trip_id: trip_id.to_string(),
            }]);
        }
        Ok(deleted)
    }
}
