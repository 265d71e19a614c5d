//! In-memory stand-in for both remote services
//!
//! Answers superhero REST calls and company SOAP envelopes the way a correct
//! server would, with switches that reproduce the remote defects the suite
//! documents. Offline tests run the real case catalogue against it.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::json;

use crate::error::E2eResult;
use crate::hero::{Hero, HeroDraft};
use crate::soap::{FieldExtractor, SoapOperation};
use crate::transport::{HttpRequest, HttpResponse, Transport};

const FIRST_HERO_ID: i64 = 1001;
const FIRST_COMPANY_ID: i64 = 5001;
const FIRST_EMPLOYEE_ID: i64 = 7001;

/// Switches reproducing known remote defects
#[derive(Debug, Clone)]
pub struct FakeBehaviour {
    /// Accept empty fields and any birth date; a missing name is still refused
    pub lenient_validation: bool,

    /// Number of initial GET-by-id calls answered with 500
    pub flaky_get_by_id: u32,

    /// A DELETE only removes the hero on every n-th call for that id
    pub delete_effective_every: u32,

    /// 1-based index of a DELETE call answered with 500
    pub failing_delete_call: Option<u32>,

    /// Keep only the last employee attached to a company
    pub one_employee_per_company: bool,

    /// Never advance `UpdatedAt` on update
    pub freeze_updated_at: bool,
}

impl Default for FakeBehaviour {
    fn default() -> Self {
        Self {
            lenient_validation: false,
            flaky_get_by_id: 0,
            delete_effective_every: 1,
            failing_delete_call: None,
            one_employee_per_company: false,
            freeze_updated_at: false,
        }
    }
}

impl FakeBehaviour {
    /// Defects observed on the real test servers
    pub fn remote_like() -> Self {
        Self {
            lenient_validation: true,
            flaky_get_by_id: 0,
            delete_effective_every: 3,
            failing_delete_call: None,
            one_employee_per_company: true,
            freeze_updated_at: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Company {
    name: String,
    employees: Vec<i64>,
}

#[derive(Debug, Clone)]
struct Employee {
    first_name: String,
    last_name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug)]
struct FakeState {
    heroes: BTreeMap<i64, Hero>,
    /// Every id ever created; DELETE on these answers 200 even once gone
    known_ids: BTreeSet<i64>,
    delete_counts: BTreeMap<i64, u32>,
    next_hero_id: i64,
    get_by_id_calls: u32,
    delete_calls: u32,
    companies: BTreeMap<i64, Company>,
    employees: BTreeMap<i64, Employee>,
    next_company_id: i64,
    next_employee_id: i64,
    clock: NaiveDateTime,
    requests: Vec<HttpRequest>,
}

impl FakeState {
    fn tick(&mut self) -> NaiveDateTime {
        self.clock += ChronoDuration::seconds(1);
        self.clock
    }
}

/// Transport answering from in-memory state
pub struct FakeServer {
    state: Mutex<FakeState>,
    behaviour: FakeBehaviour,
}

impl FakeServer {
    pub fn new(behaviour: FakeBehaviour) -> Self {
        let epoch = NaiveDate::from_ymd_opt(2019, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();

        let mut heroes = BTreeMap::new();
        heroes.insert(
            1,
            Hero {
                id: 1,
                full_name: Some("Bruce Wayne".to_string()),
                gender: Some("M".to_string()),
                birth_date: Some("1939-05-01".to_string()),
                city: Some("Gotham".to_string()),
                main_skill: Some("Detective".to_string()),
                phone: None,
            },
        );

        Self {
            state: Mutex::new(FakeState {
                known_ids: heroes.keys().copied().collect(),
                heroes,
                delete_counts: BTreeMap::new(),
                next_hero_id: FIRST_HERO_ID,
                get_by_id_calls: 0,
                delete_calls: 0,
                companies: BTreeMap::new(),
                employees: BTreeMap::new(),
                next_company_id: FIRST_COMPANY_ID,
                next_employee_id: FIRST_EMPLOYEE_ID,
                clock: epoch,
                requests: Vec::new(),
            }),
            behaviour,
        }
    }

    /// Insert a hero directly, bypassing validation
    pub fn seed_hero(&self, full_name: &str) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_hero_id;
        state.next_hero_id += 1;
        let draft = HeroDraft::new("", id, full_name, "M", "2019-01-01", "Seed", "Seed", "");
        state.heroes.insert(id, hero_from_draft(id, &draft));
        state.known_ids.insert(id);
        id
    }

    pub fn heroes(&self) -> Vec<Hero> {
        self.state.lock().heroes.values().cloned().collect()
    }

    pub fn delete_calls(&self) -> u32 {
        self.state.lock().delete_calls
    }

    /// Every request seen, headers and body included
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().requests.clone()
    }

    pub fn company_employees(&self, company_id: i64) -> Vec<i64> {
        self.state
            .lock()
            .companies
            .get(&company_id)
            .map(|c| c.employees.clone())
            .unwrap_or_default()
    }

    /// Lenient mode mirrors the live service: any present name is enough
    fn accepts(&self, draft: &HeroDraft) -> bool {
        if self.behaviour.lenient_validation {
            draft.full_name.is_some()
        } else {
            is_valid(draft)
        }
    }

    fn handle_rest(&self, state: &mut FakeState, request: &HttpRequest) -> HttpResponse {
        let Some(index) = request.url.find("/superheroes") else {
            return HttpResponse::new(404, "");
        };
        let tail = request.url[index + "/superheroes".len()..].trim_matches('/');
        let id = if tail.is_empty() {
            None
        } else {
            match tail.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => return HttpResponse::new(400, r#"{"message":"bad id"}"#),
            }
        };

        match (&request.method, id) {
            (&Method::GET, None) => {
                let heroes: Vec<&Hero> = state.heroes.values().collect();
                json_response(200, &heroes)
            }
            (&Method::GET, Some(id)) => {
                state.get_by_id_calls += 1;
                if state.get_by_id_calls <= self.behaviour.flaky_get_by_id {
                    return HttpResponse::new(500, r#"{"message":"internal error"}"#);
                }
                match state.heroes.get(&id) {
                    Some(hero) => json_response(200, hero),
                    None => HttpResponse::new(404, r#"{"message":"not found"}"#),
                }
            }
            (&Method::POST, None) => {
                let draft = match parse_draft(request) {
                    Ok(draft) => draft,
                    Err(response) => return response,
                };
                if !self.accepts(&draft) {
                    return HttpResponse::new(403, r#"{"message":"validation failed"}"#);
                }
                let id = state.next_hero_id;
                state.next_hero_id += 1;
                let hero = hero_from_draft(id, &draft);
                state.heroes.insert(id, hero.clone());
                state.known_ids.insert(id);
                json_response(200, &hero)
            }
            (&Method::PUT, Some(id)) => {
                if !state.heroes.contains_key(&id) {
                    return HttpResponse::new(404, r#"{"message":"not found"}"#);
                }
                let draft = match parse_draft(request) {
                    Ok(draft) => draft,
                    Err(response) => return response,
                };
                if !self.accepts(&draft) {
                    return HttpResponse::new(403, r#"{"message":"validation failed"}"#);
                }
                let hero = hero_from_draft(id, &draft);
                state.heroes.insert(id, hero.clone());
                json_response(200, &hero)
            }
            (&Method::DELETE, Some(id)) => {
                state.delete_calls += 1;
                if self.behaviour.failing_delete_call == Some(state.delete_calls) {
                    return HttpResponse::new(500, r#"{"message":"internal error"}"#);
                }
                if !state.known_ids.contains(&id) {
                    return HttpResponse::new(404, r#"{"message":"not found"}"#);
                }
                let count = state.delete_counts.entry(id).or_insert(0);
                *count += 1;
                if *count % self.behaviour.delete_effective_every.max(1) == 0 {
                    state.heroes.remove(&id);
                }
                HttpResponse::new(200, "")
            }
            _ => HttpResponse::new(405, ""),
        }
    }

    fn handle_soap(&self, state: &mut FakeState, request: &HttpRequest) -> HttpResponse {
        let body = request.body.as_deref().unwrap_or_default();
        let fields = FieldExtractor::new("sch");
        let text = |tag: &str| fields.single(body, tag).unwrap_or_default();
        let id = |tag: &str| text(tag).trim().parse::<i64>().ok();

        let Some(operation) = SoapOperation::detect(body) else {
            return soap_fault("unknown operation");
        };

        match operation {
            SoapOperation::AddCompany => {
                let company_id = state.next_company_id;
                state.next_company_id += 1;
                let company = Company {
                    name: text("Name"),
                    employees: Vec::new(),
                };
                let xml = company_xml(company_id, &company);
                state.companies.insert(company_id, company);
                soap_response(operation, &xml)
            }
            SoapOperation::AddEmployee => {
                let employee_id = state.next_employee_id;
                state.next_employee_id += 1;
                let now = state.tick();
                let employee = Employee {
                    first_name: text("FirstName"),
                    last_name: text("LastName"),
                    created_at: now,
                    updated_at: now,
                };
                let xml = employee_xml(employee_id, &employee);
                state.employees.insert(employee_id, employee);
                soap_response(operation, &xml)
            }
            SoapOperation::AddEmployeeToCompany | SoapOperation::AddMultipleEmployeesToCompany => {
                let Some(company_id) = id("CompanyId") else {
                    return soap_fault("missing company id");
                };
                let requested: Vec<i64> = fields
                    .all(body, "EmployeeId")
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|v| v.trim().parse().ok())
                    .collect();
                if requested.is_empty() || requested.iter().any(|e| !state.employees.contains_key(e)) {
                    return soap_fault("unknown employee");
                }
                let one_only = self.behaviour.one_employee_per_company;
                let Some(company) = state.companies.get_mut(&company_id) else {
                    return soap_fault("unknown company");
                };
                for employee_id in requested {
                    if one_only {
                        company.employees.clear();
                    }
                    if !company.employees.contains(&employee_id) {
                        company.employees.push(employee_id);
                    }
                }
                let members: String = company
                    .employees
                    .iter()
                    .map(|e| format!("<ns2:EmployeeId>{e}</ns2:EmployeeId>"))
                    .collect();
                let xml = format!(
                    "<ns2:CompanyId>{company_id}</ns2:CompanyId>\n<ns2:EmployeeIds>{members}</ns2:EmployeeIds>"
                );
                soap_response(operation, &xml)
            }
            SoapOperation::GetCompany => match id("Id").and_then(|i| state.companies.get(&i).map(|c| (i, c))) {
                Some((company_id, company)) => soap_response(operation, &company_xml(company_id, company)),
                None => soap_fault("company not found"),
            },
            SoapOperation::UpdateEmployee => {
                let now = state.tick();
                let freeze = self.behaviour.freeze_updated_at;
                let Some(employee_id) = id("Id") else {
                    return soap_fault("missing employee id");
                };
                let Some(employee) = state.employees.get_mut(&employee_id) else {
                    return soap_fault("employee not found");
                };
                employee.first_name = text("FirstName");
                employee.last_name = text("LastName");
                if !freeze {
                    employee.updated_at = now;
                }
                let xml = employee_xml(employee_id, employee);
                soap_response(operation, &xml)
            }
        }
    }
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new(FakeBehaviour::default())
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn execute(&self, request: HttpRequest) -> E2eResult<HttpResponse> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        if request.header_value("SOAPAction").is_some() {
            Ok(self.handle_soap(&mut state, &request))
        } else {
            Ok(self.handle_rest(&mut state, &request))
        }
    }
}

fn parse_draft(request: &HttpRequest) -> Result<HeroDraft, HttpResponse> {
    let body = request.body.as_deref().unwrap_or_default();
    serde_json::from_str(body).map_err(|e| HttpResponse::new(400, json!({ "message": e.to_string() }).to_string()))
}

/// Validation a correct service would apply
fn is_valid(draft: &HeroDraft) -> bool {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1);
    let birth_ok = draft
        .birth_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .is_some_and(|d| Some(d) >= earliest);

    draft.id >= 0
        && filled(&draft.full_name)
        && matches!(draft.gender.as_deref(), Some("M") | Some("F"))
        && birth_ok
        && filled(&draft.city)
        && filled(&draft.main_skill)
}

fn hero_from_draft(id: i64, draft: &HeroDraft) -> Hero {
    Hero {
        id,
        full_name: draft.full_name.clone(),
        gender: draft.gender.clone(),
        birth_date: draft.birth_date.clone(),
        city: draft.city.clone(),
        main_skill: draft.main_skill.clone(),
        phone: draft.phone.clone(),
    }
}

fn json_response<T: serde::Serialize + ?Sized>(status: u16, value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => HttpResponse::new(status, body),
        Err(e) => HttpResponse::new(500, e.to_string()),
    }
}

fn company_xml(id: i64, company: &Company) -> String {
    let members: String = company
        .employees
        .iter()
        .map(|e| format!("<ns2:EmployeeId>{e}</ns2:EmployeeId>"))
        .collect();
    format!(
        "<ns2:Id>{id}</ns2:Id>\n<ns2:Name>{}</ns2:Name>\n<ns2:EmployeeIds>{members}</ns2:EmployeeIds>",
        company.name
    )
}

fn employee_xml(id: i64, employee: &Employee) -> String {
    format!(
        "<ns2:Id>{id}</ns2:Id>\n<ns2:FirstName>{}</ns2:FirstName>\n<ns2:LastName>{}</ns2:LastName>\n<ns2:CreatedAt>{}</ns2:CreatedAt>\n<ns2:UpdatedAt>{}</ns2:UpdatedAt>",
        employee.first_name,
        employee.last_name,
        employee.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
        employee.updated_at.format("%Y-%m-%dT%H:%M:%SZ"),
    )
}

fn soap_response(operation: SoapOperation, inner: &str) -> HttpResponse {
    HttpResponse::new(
        200,
        format!(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\">\n\
             <SOAP-ENV:Header/>\n<SOAP-ENV:Body>\n\
             <ns2:{name}Response xmlns:ns2=\"http://soap.qa-test.csssr.com/schemas\">\n{inner}\n</ns2:{name}Response>\n\
             </SOAP-ENV:Body>\n</SOAP-ENV:Envelope>",
            name = operation.name()
        ),
    )
}

fn soap_fault(reason: &str) -> HttpResponse {
    HttpResponse::new(
        500,
        format!(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\">\
             <SOAP-ENV:Body><SOAP-ENV:Fault><faultcode>SOAP-ENV:Server</faultcode>\
             <faultstring>{reason}</faultstring></SOAP-ENV:Fault></SOAP-ENV:Body></SOAP-ENV:Envelope>"
        ),
    )
}
