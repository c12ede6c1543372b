mod common;

use chrono::{Local, NaiveDate};
use cucumber::{given, then, when, World as _};
use itinera::{
    auth,
    models::{
        activity::NewActivity,
        expense::{ExpenseCategory, NewExpense},
        trip::{NewTrip, Trip, TripUpdate},
        user::User,
    },
    services::{budget::BudgetSummary, trips},
    state::AppState,
};

use common::TestApp;

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    app: Option<TestApp>,
    user: Option<User>,
    trip: Option<Trip>,
}

impl AppWorld {
    fn app_state(&self) -> &AppState {
        &self
            .app
            .as_ref()
            .expect("state must be initialised first")
            .state
    }

    fn user(&self) -> &User {
        self.user.as_ref().expect("a user must be registered first")
    }

    fn trip(&self) -> &Trip {
        self.trip.as_ref().expect("a trip must be created first")
    }
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("date in YYYY-MM-DD form")
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut AppWorld) {
    world.app = Some(TestApp::new().await.expect("state"));
    world.user = None;
    world.trip = None;
}

#[given(regex = r#"^a registered user "([^"]+)" with email "([^"]+)" and password "([^"]+)"$"#)]
async fn given_registered_user(world: &mut AppWorld, name: String, email: String, password: String) {
    register(world, name, email, password).await;
}

#[when(regex = r#"^I register "([^"]+)" with email "([^"]+)" and password "([^"]+)"$"#)]
async fn when_register(world: &mut AppWorld, name: String, email: String, password: String) {
    register(world, name, email, password).await;
}

async fn register(world: &mut AppWorld, name: String, email: String, password: String) {
    let user = auth::register_user(world.app_state(), &name, &email, &password)
        .await
        .expect("register user");
    world.user = Some(user);
}

#[then(regex = r#"^I can sign in as "([^"]+)" using password "([^"]+)"$"#)]
async fn then_can_sign_in(world: &mut AppWorld, email: String, password: String) {
    let user = auth::authenticate_user(world.app_state(), &email, &password)
        .await
        .expect("authentication");
    assert_eq!(user.email, email);
    assert_eq!(user.uuid, world.user().uuid);
}

#[then(regex = r#"^signing in as "([^"]+)" with password "([^"]+)" fails with "([^"]+)"$"#)]
async fn then_sign_in_fails(world: &mut AppWorld, email: String, password: String, message: String) {
    let err = auth::authenticate_user(world.app_state(), &email, &password)
        .await
        .expect_err("sign in should fail");
    assert_eq!(err.to_string(), message);
}

#[then(
    regex = r#"^registering "([^"]+)" with email "([^"]*)" and password "([^"]*)" fails with "([^"]+)"$"#
)]
async fn then_register_fails(
    world: &mut AppWorld,
    name: String,
    email: String,
    password: String,
    message: String,
) {
    let err = auth::register_user(world.app_state(), &name, &email, &password)
        .await
        .expect_err("registration should fail");
    assert_eq!(err.to_string(), message);
}

#[given(regex = r#"^I create a trip to "([^"]+)" from "([^"]+)" to "([^"]+)"$"#)]
async fn given_trip(world: &mut AppWorld, destination: String, start: String, end: String) {
    create_trip(world, destination, start, end, 0.0).await;
}

#[given(regex = r#"^I create a trip to "([^"]+)" from "([^"]+)" to "([^"]+)" with a budget of (\d+)$"#)]
async fn given_trip_with_budget(
    world: &mut AppWorld,
    destination: String,
    start: String,
    end: String,
    budget: f64,
) {
    create_trip(world, destination, start, end, budget).await;
}

async fn create_trip(world: &mut AppWorld, destination: String, start: String, end: String, budget: f64) {
    let form = NewTrip {
        title: format!("Trip to {destination}"),
        destination,
        start_date: Some(date(&start)),
        end_date: Some(date(&end)),
        total_budget: budget,
        ..Default::default()
    };
    let (trip, _) = trips::create_trip(&world.app_state().store, world.user(), &form)
        .await
        .expect("create trip");
    world.trip = Some(trip);
}

#[given(regex = r#"^day (\d+) has an activity "([^"]+)"$"#)]
async fn given_activity(world: &mut AppWorld, day_number: i64, name: String) {
    let store = &world.app_state().store;
    let trip = world.trip();
    let days = store.list_days(&trip.id).await.expect("list days");
    let day = days
        .iter()
        .find(|day| day.day_number == day_number)
        .expect("day with that number");
    let fields = NewActivity {
        name,
        start_time: "10:00".into(),
        ..Default::default()
    }
    .validate()
    .expect("valid activity");
    store
        .create_activity(&trip.id, &day.id, &fields, None)
        .await
        .expect("create activity");
}

#[when(regex = r#"^I move the trip to "([^"]+)" until "([^"]+)"$"#)]
async fn when_move_trip(world: &mut AppWorld, start: String, end: String) {
    let update = TripUpdate {
        start_date: Some(date(&start)),
        end_date: Some(date(&end)),
        ..Default::default()
    };
    let updated = trips::update_trip(&world.app_state().store, world.trip(), &update)
        .await
        .expect("update trip");
    world.trip = Some(updated);
}

#[then(regex = r#"^the trip has days "([^"]+)"$"#)]
async fn then_trip_days(world: &mut AppWorld, expected: String) {
    let days = world
        .app_state()
        .store
        .list_days(&world.trip().id)
        .await
        .expect("list days");
    let actual: Vec<String> = days
        .iter()
        .map(|day| format!("{}:{}", day.date, day.day_number))
        .collect();
    assert_eq!(actual.join(", "), expected);
}

#[then(regex = r"^the trip has (\d+) packing items$")]
async fn then_packing_items(world: &mut AppWorld, expected: usize) {
    let items = world
        .app_state()
        .store
        .list_packing_items(&world.trip().id)
        .await
        .expect("list packing");
    assert_eq!(items.len(), expected);
    assert!(items.iter().all(|item| !item.packed));
}

#[then(regex = r"^the trip has (\d+) activit(?:y|ies)$")]
async fn then_activity_count(world: &mut AppWorld, expected: usize) {
    let activities = world
        .app_state()
        .store
        .list_trip_activities(&world.trip().id)
        .await
        .expect("list activities");
    assert_eq!(activities.len(), expected);
}

#[given(regex = r#"^I spend (\d+) on "([^"]+)" titled "([^"]+)" on "([^"]+)"$"#)]
async fn given_expense(world: &mut AppWorld, amount: f64, category: String, title: String, on: String) {
    let form = expense_form(amount, &category, title, &on);
    let fields = form
        .validate(world.trip(), Local::now().date_naive())
        .expect("valid expense");
    world
        .app_state()
        .store
        .create_expense(&world.trip().id, &fields)
        .await
        .expect("create expense");
}

#[then(regex = r#"^spending (\d+) on "([^"]+)" titled "([^"]+)" on "([^"]+)" is rejected with "([^"]+)"$"#)]
async fn then_expense_rejected(
    world: &mut AppWorld,
    amount: f64,
    category: String,
    title: String,
    on: String,
    message: String,
) {
    let form = expense_form(amount, &category, title, &on);
    let err = form
        .validate(world.trip(), Local::now().date_naive())
        .expect_err("expense should be rejected");
    assert_eq!(err.to_string(), message);
}

fn expense_form(amount: f64, category: &str, title: String, on: &str) -> NewExpense {
    NewExpense {
        title,
        amount,
        category: category.parse::<ExpenseCategory>().expect("expense category"),
        date: Some(date(on)),
    }
}

#[then(regex = r"^the budget shows (\d+) spent and (-?\d+) remaining$")]
async fn then_budget(world: &mut AppWorld, spent: f64, remaining: f64) {
    let summary = budget(world).await;
    assert_eq!(summary.total_spent, spent);
    assert_eq!(summary.remaining, remaining);
}

#[then(regex = r#"^"([^"]+)" accounts for (\d+) percent of spending$"#)]
async fn then_category_share(world: &mut AppWorld, category: String, percent: f64) {
    let summary = budget(world).await;
    let category = category.parse::<ExpenseCategory>().expect("expense category");
    let total = summary.category(category).expect("category total");
    assert!((total.percent - percent).abs() < 1e-9, "{}", total.percent);
}

async fn budget(world: &AppWorld) -> BudgetSummary {
    let trip = world.trip();
    let expenses = world
        .app_state()
        .store
        .list_expenses(&trip.id)
        .await
        .expect("list expenses");
    BudgetSummary::compute(trip.total_budget, &expenses)
}

#[when("I open the trip overview")]
async fn when_open_overview(world: &mut AppWorld) {
    trips::trip_overview(&world.app_state().store, world.user(), world.trip().clone())
        .await
        .expect("overview");
}

#[then("the trip is remembered as my last trip")]
async fn then_last_trip(world: &mut AppWorld) {
    let user = stored_user(world).await;
    assert_eq!(user.last_trip_id.as_deref(), Some(world.trip().id.as_str()));
}

#[when("I delete the trip")]
async fn when_delete_trip(world: &mut AppWorld) {
    trips::delete_trip(&world.app_state().store, world.trip())
        .await
        .expect("delete trip");
}

#[then("nothing remains stored for the trip")]
async fn then_nothing_remains(world: &mut AppWorld) {
    let db = world.app_state().store.db();
    let trip_id = &world.trip().id;
    for table in ["trip_days", "activities", "expenses", "packing_items"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE trip_id = ?"))
            .bind(trip_id)
            .fetch_one(db)
            .await
            .expect("count rows");
        assert_eq!(count, 0, "{table} still has rows");
    }
    let trip = world.app_state().store.get_trip(trip_id).await.expect("get trip");
    assert!(trip.is_none());
    assert!(stored_user(world).await.last_trip_id.is_none());
}

async fn stored_user(world: &AppWorld) -> User {
    world
        .app_state()
        .store
        .find_user_by_uuid(&world.user().uuid)
        .await
        .expect("find user")
        .expect("user exists")
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
