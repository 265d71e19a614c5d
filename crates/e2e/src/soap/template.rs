//! Request envelope templates with sentinel placeholders

use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// Sentinel tokens present in the shipped templates
pub mod tokens {
    pub const COMPANY_NAME: &str = "TestCompanyName";
    pub const FIRST_NAME: &str = "AutotestFirstName";
    pub const LAST_NAME: &str = "AutotestLastName";
    pub const COMPANY_ID: &str = "TestCompanyId";
    pub const EMPLOYEE_ID: &str = "TestEmployeeId";
    pub const SECOND_EMPLOYEE_ID: &str = "TestSecondEmployeeId";
}

/// Operations exposed by the company SOAP service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapOperation {
    AddCompany,
    AddEmployee,
    AddEmployeeToCompany,
    AddMultipleEmployeesToCompany,
    GetCompany,
    UpdateEmployee,
}

impl SoapOperation {
    pub const ALL: [SoapOperation; 6] = [
        SoapOperation::AddCompany,
        SoapOperation::AddEmployee,
        SoapOperation::AddEmployeeToCompany,
        SoapOperation::AddMultipleEmployeesToCompany,
        SoapOperation::GetCompany,
        SoapOperation::UpdateEmployee,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoapOperation::AddCompany => "AddCompany",
            SoapOperation::AddEmployee => "AddEmployee",
            SoapOperation::AddEmployeeToCompany => "AddEmployeeToCompany",
            SoapOperation::AddMultipleEmployeesToCompany => "AddMultipleEmployeesToCompany",
            SoapOperation::GetCompany => "GetCompany",
            SoapOperation::UpdateEmployee => "UpdateEmployee",
        }
    }

    /// Template file name inside the templates directory
    pub fn file_name(&self) -> String {
        format!("{}Request.xml", self.name())
    }

    /// Identify the operation an envelope body carries
    pub fn detect(envelope: &str) -> Option<SoapOperation> {
        // Longest names first so AddEmployeeToCompany is not read as AddEmployee
        let mut ops = Self::ALL;
        ops.sort_by_key(|op| std::cmp::Reverse(op.name().len()));
        ops.into_iter()
            .find(|op| envelope.contains(&format!("{}Request", op.name())))
    }
}

/// An envelope template or a request produced from one.
///
/// Substitution returns a new envelope; the loaded template is never
/// modified, so one template can feed any number of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapTemplate {
    operation: SoapOperation,
    text: String,
}

impl SoapTemplate {
    pub fn new(operation: SoapOperation, text: impl Into<String>) -> Self {
        Self {
            operation,
            text: text.into(),
        }
    }

    /// Read the template for `operation` from `dir`
    pub fn load(dir: &Path, operation: SoapOperation) -> E2eResult<Self> {
        let path = dir.join(operation.file_name());
        if !path.is_file() {
            return Err(E2eError::TemplateNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(Self::new(operation, text))
    }

    /// Replace every occurrence of `token` with `value`
    pub fn substitute(&self, token: &str, value: &str) -> Self {
        Self {
            operation: self.operation,
            text: self.text.replace(token, value),
        }
    }

    pub fn operation(&self) -> SoapOperation {
        self.operation
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// All six templates, read once per case
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub add_company: SoapTemplate,
    pub add_employee: SoapTemplate,
    pub add_employee_to_company: SoapTemplate,
    pub add_multiple_employees_to_company: SoapTemplate,
    pub get_company: SoapTemplate,
    pub update_employee: SoapTemplate,
}

impl TemplateSet {
    pub fn load(dir: &Path) -> E2eResult<Self> {
        Ok(Self {
            add_company: SoapTemplate::load(dir, SoapOperation::AddCompany)?,
            add_employee: SoapTemplate::load(dir, SoapOperation::AddEmployee)?,
            add_employee_to_company: SoapTemplate::load(dir, SoapOperation::AddEmployeeToCompany)?,
            add_multiple_employees_to_company: SoapTemplate::load(
                dir,
                SoapOperation::AddMultipleEmployeesToCompany,
            )?,
            get_company: SoapTemplate::load(dir, SoapOperation::GetCompany)?,
            update_employee: SoapTemplate::load(dir, SoapOperation::UpdateEmployee)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_leaves_original_untouched() {
        let template = SoapTemplate::new(
            SoapOperation::AddCompany,
            "<sch:Name>TestCompanyName</sch:Name>",
        );
        let request = template.substitute(tokens::COMPANY_NAME, "Autotest_AutotestCompany");

        assert_eq!(request.as_str(), "<sch:Name>Autotest_AutotestCompany</sch:Name>");
        assert_eq!(template.as_str(), "<sch:Name>TestCompanyName</sch:Name>");
    }

    #[test]
    fn substitute_replaces_all_occurrences() {
        let template = SoapTemplate::new(SoapOperation::AddEmployeeToCompany, "TestCompanyId/TestCompanyId");
        assert_eq!(template.substitute(tokens::COMPANY_ID, "5").as_str(), "5/5");
    }

    #[test]
    fn detect_prefers_longest_operation_name() {
        let body = "<sch:AddEmployeeToCompanyRequest>";
        assert_eq!(SoapOperation::detect(body), Some(SoapOperation::AddEmployeeToCompany));
        assert_eq!(
            SoapOperation::detect("<sch:AddEmployeeRequest>"),
            Some(SoapOperation::AddEmployee)
        );
        assert_eq!(SoapOperation::detect("<nothing/>"), None);
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = SoapTemplate::load(dir.path(), SoapOperation::GetCompany).unwrap_err();
        assert!(matches!(err, E2eError::TemplateNotFound(p) if p.ends_with("GetCompanyRequest.xml")));
    }

    #[test]
    fn shipped_templates_carry_their_tokens() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/soap");
        let set = TemplateSet::load(&dir).unwrap();

        assert!(set.add_company.as_str().contains(tokens::COMPANY_NAME));
        assert!(set.add_employee.as_str().contains(tokens::FIRST_NAME));
        assert!(set.add_employee.as_str().contains(tokens::LAST_NAME));
        assert!(set.add_employee_to_company.as_str().contains(tokens::COMPANY_ID));
        assert!(set.add_employee_to_company.as_str().contains(tokens::EMPLOYEE_ID));
        assert!(set
            .add_multiple_employees_to_company
            .as_str()
            .contains(tokens::SECOND_EMPLOYEE_ID));
        assert!(set.get_company.as_str().contains(tokens::COMPANY_ID));
        assert!(set.update_employee.as_str().contains(tokens::EMPLOYEE_ID));

        for op in SoapOperation::ALL {
            let template = SoapTemplate::load(&dir, op).unwrap();
            assert_eq!(SoapOperation::detect(template.as_str()), Some(op));
        }
    }
}
