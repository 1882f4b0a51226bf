use casbin::prelude::DefaultModel;

// Coarse checks: (role, resource class, action).
const API_MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
"#;

// Fine checks: (role, org id, category, resource id, action). Org, category
// and resource are matched exactly; only the subject goes through `g`.
const RESOURCE_MODEL: &str = r#"
[request_definition]
r = sub, dom, cat, obj, act

[policy_definition]
p = sub, dom, cat, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.dom == p.dom && r.cat == p.cat && r.obj == p.obj && r.act == p.act
"#;

pub async fn api_model() -> casbin::Result<DefaultModel> {
    DefaultModel::from_str(API_MODEL).await
}

pub async fn resource_model() -> casbin::Result<DefaultModel> {
    DefaultModel::from_str(RESOURCE_MODEL).await
}
