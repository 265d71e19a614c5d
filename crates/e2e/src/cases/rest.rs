//! Superhero CRUD cases

use tracing::debug;

use crate::cases::{CaseContext, SuiteKind, TestCase};
use crate::error::{E2eError, E2eResult};
use crate::hero::{Hero, HeroDraft};
use crate::retry::retry_with;
use crate::{ensure, ensure_eq};

/// Literal parameters of a hero fixture
#[derive(Debug, Clone, Copy)]
pub struct HeroParams {
    pub id: i64,
    pub full_name: &'static str,
    pub gender: &'static str,
    pub birth_date: &'static str,
    pub city: &'static str,
    pub main_skill: &'static str,
    pub phone: &'static str,
}

impl HeroParams {
    pub fn draft(&self, prefix: &str) -> HeroDraft {
        HeroDraft::new(
            prefix,
            self.id,
            self.full_name,
            self.gender,
            self.birth_date,
            self.city,
            self.main_skill,
            self.phone,
        )
    }
}

const fn params(
    id: i64,
    full_name: &'static str,
    gender: &'static str,
    birth_date: &'static str,
    city: &'static str,
    main_skill: &'static str,
    phone: &'static str,
) -> HeroParams {
    HeroParams {
        id,
        full_name,
        gender,
        birth_date,
        city,
        main_skill,
        phone,
    }
}

/// Valid heroes; the last one has no phone
pub const VALID_HEROES: [HeroParams; 3] = [
    params(900, "AutoTestMan", "M", "2019-01-01", "BugLand", "Debug", "911"),
    params(900, "Debugger2", "F", "2019-01-01", "BugLand2", "Review2", "911a"),
    params(900, "Debugger2", "F", "2019-01-01", "BugLand2", "Review2", ""),
];

/// Heroes a correct service must refuse with 403
pub const MALFORMED_HEROES: [HeroParams; 8] = [
    params(900, "", "M", "2019-01-01", "BugLand", "Debug", "911"),
    params(-1, "Debugger", "U", "0001-01-01", "BugLand2", "Review2", "911a"),
    params(900, "Debugger", "U", "0001-01-01", "BugLand2", "Review2", "911a"),
    params(900, "Debugger2", "", "0001-01-01", "BugLand2", "Review2", "911a"),
    params(900, "Debugger3", "M", "", "BugLand2", "Review2", "911a"),
    params(900, "Debugger3", "M", "2019-01-01", "", "Review2", "911a"),
    params(900, "Debugger3", "M", "2019-01-01", "BugLand2", "", "911a"),
    params(900, "Debugger3", "M", "SomeText", "BugLand2", "Review2", "911a"),
];

pub const EDITED_CITY: &str = "DebuggedLand";
pub const REJECTED_STATUS: u16 = 403;

pub fn cases() -> Vec<TestCase> {
    let mut cases = vec![TestCase::new(
        SuiteKind::Rest,
        10,
        "rest_10_list_returns_heroes",
        list_returns_heroes,
    )];

    for (i, p) in VALID_HEROES.into_iter().enumerate() {
        cases.push(
            TestCase::new(
                SuiteKind::Rest,
                20,
                format!("rest_20_create_is_listed[{}]", i + 1),
                move |ctx| create_is_listed(ctx, p),
            )
            .known_defect("GET by id fails about half the time and the list mixes up ids"),
        );
    }

    cases.push(
        TestCase::new(
            SuiteKind::Rest,
            30,
            "rest_30_update_replaces_whole_hero",
            update_replaces_whole_hero,
        )
        .known_defect("PUT answers with an error most of the time and GET by id is flaky"),
    );
    cases.push(
        TestCase::new(SuiteKind::Rest, 40, "rest_40_delete_removes_hero", delete_removes_hero)
            .known_defect("DELETE only takes effect on every third or fourth call"),
    );

    for (i, p) in MALFORMED_HEROES.into_iter().enumerate() {
        cases.push(
            TestCase::new(
                SuiteKind::Rest,
                50,
                format!("rest_50_create_rejects_malformed[{}]", i + 1),
                move |ctx| create_rejects_malformed(ctx, p),
            )
            .known_defect("service accepts empty required fields and any text as birth date"),
        );
    }

    cases.push(TestCase::new(
        SuiteKind::Rest,
        60,
        "rest_60_create_rejects_missing_name",
        create_rejects_missing_name,
    ));
    cases.push(TestCase::new(
        SuiteKind::Rest,
        70,
        "rest_70_create_then_get_with_retry",
        create_then_get_with_retry,
    ));

    cases
}

/// POST the draft, require success and record the returned id
async fn create_registered(ctx: &CaseContext, draft: &HeroDraft) -> E2eResult<Hero> {
    let response = ctx.heroes.create(draft).await?;
    ensure!(
        response.is_success(),
        "POST /superheroes returned {}: {}",
        response.status,
        response.body
    );
    let hero: Hero = response.json()?;
    ctx.registry.record(hero.id);
    debug!("Created hero {}", hero.id);
    Ok(hero)
}

/// POST the draft and require the rejection status
async fn expect_rejected(ctx: &CaseContext, draft: &HeroDraft) -> E2eResult<()> {
    let response = ctx.heroes.create(draft).await?;
    if response.is_success() {
        // Accepted anyway; keep it reachable for registry cleanup
        if let Ok(hero) = response.json::<Hero>() {
            ctx.registry.record(hero.id);
        }
    }
    if response.is_success() || response.status != REJECTED_STATUS {
        return Err(E2eError::UnexpectedStatus {
            expected: REJECTED_STATUS.to_string(),
            actual: response.status,
            body: response.body,
        });
    }
    Ok(())
}

pub async fn list_returns_heroes(ctx: CaseContext) -> E2eResult<()> {
    let response = ctx.heroes.list().await?;
    ensure!(response.is_success(), "GET /superheroes returned {}", response.status);

    let heroes: Vec<Hero> = response.json()?;
    ensure!(!heroes.is_empty(), "hero list is empty");
    Ok(())
}

pub async fn create_is_listed(ctx: CaseContext, params: HeroParams) -> E2eResult<()> {
    let created = create_registered(&ctx, &params.draft(ctx.prefix())).await?;

    let heroes = ctx.heroes.list_heroes().await?;
    let by_id = ctx.heroes.get(created.id).await?;
    ensure!(
        by_id.is_success(),
        "GET /superheroes/{} returned {}",
        created.id,
        by_id.status
    );
    let fetched: Hero = by_id.json()?;

    ensure!(
        heroes.iter().any(|h| h.id == created.id),
        "hero {} missing from list",
        created.id
    );
    ensure!(
        heroes.iter().any(|h| h.full_name == created.full_name),
        "no listed hero named {:?}",
        created.full_name
    );
    ensure_eq!(fetched.id, created.id);
    Ok(())
}

pub async fn update_replaces_whole_hero(ctx: CaseContext) -> E2eResult<()> {
    let created = create_registered(&ctx, &HeroDraft::standard(ctx.prefix())).await?;

    let edited = HeroDraft::standard(ctx.prefix()).with_city(EDITED_CITY);
    let put = ctx.heroes.update(created.id, &edited).await?;
    ensure!(
        put.is_success(),
        "PUT /superheroes/{} returned {}",
        created.id,
        put.status
    );

    let by_id = ctx.heroes.get(created.id).await?;
    ensure!(
        by_id.is_success(),
        "GET /superheroes/{} returned {}",
        created.id,
        by_id.status
    );
    let fetched: Hero = by_id.json()?;
    ensure_eq!(fetched.city.as_deref(), Some(EDITED_CITY));
    Ok(())
}

pub async fn delete_removes_hero(ctx: CaseContext) -> E2eResult<()> {
    let created = create_registered(&ctx, &HeroDraft::standard(ctx.prefix())).await?;

    let delete = ctx.heroes.delete(created.id).await?;
    ensure!(
        delete.is_success(),
        "DELETE /superheroes/{} returned {}",
        created.id,
        delete.status
    );

    let by_id = ctx.heroes.get(created.id).await?;
    ensure!(!by_id.is_success(), "hero {} still readable after delete", created.id);
    ensure_eq!(by_id.status, 404);
    Ok(())
}

pub async fn create_rejects_malformed(ctx: CaseContext, params: HeroParams) -> E2eResult<()> {
    expect_rejected(&ctx, &params.draft(ctx.prefix())).await
}

pub async fn create_rejects_missing_name(ctx: CaseContext) -> E2eResult<()> {
    expect_rejected(&ctx, &HeroDraft::standard(ctx.prefix()).without_full_name()).await
}

pub async fn create_then_get_with_retry(ctx: CaseContext) -> E2eResult<()> {
    let created = create_registered(&ctx, &HeroDraft::standard(ctx.prefix())).await?;
    ctx.heroes.list().await?;

    let id = created.id;
    let by_id = retry_with(&ctx.config.retry, || ctx.heroes.get(id)).await?;
    ensure!(
        by_id.is_success(),
        "GET /superheroes/{} still failing after {} attempt(s): {}",
        id,
        ctx.config.retry.max_attempts,
        by_id.status
    );
    let fetched: Hero = by_id.json()?;
    ensure_eq!(fetched.id, created.id);
    Ok(())
}
