//! In-memory stand-in for a Mayan EDMS server.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::client::{
    ClientError, DocumentType, DocumentTypeApi, Group, GroupApi, IndexTemplate, IndexTemplateApi,
    IndexTemplateNode, MetadataType, MetadataTypeApi, Role, RoleApi, Source, SourceApi, Tag,
    TagApi, WorkflowTemplate, WorkflowTemplateApi, WorkflowTemplateState,
    WorkflowTemplateTransition,
};

#[derive(Default)]
struct Store {
    last_id: i64,
    calls: Vec<String>,
    failures: HashMap<String, (u16, String)>,

    document_types: BTreeMap<i64, DocumentType>,
    sources: BTreeMap<i64, Source>,
    tags: BTreeMap<i64, Tag>,
    index_templates: BTreeMap<i64, IndexTemplate>,
    index_nodes: BTreeMap<(i64, i64), IndexTemplateNode>,
    index_document_types: BTreeMap<i64, BTreeSet<i64>>,
    groups: BTreeMap<i64, Group>,
    group_users: BTreeMap<i64, BTreeSet<i64>>,
    roles: BTreeMap<i64, Role>,
    role_groups: BTreeMap<i64, BTreeSet<i64>>,
    role_permissions: BTreeMap<i64, BTreeSet<String>>,
    workflow_templates: BTreeMap<i64, WorkflowTemplate>,
    workflow_document_types: BTreeMap<i64, BTreeSet<i64>>,
    states: BTreeMap<(i64, i64), WorkflowTemplateState>,
    transitions: BTreeMap<(i64, i64), WorkflowTemplateTransition>,
    metadata_types: BTreeMap<i64, MetadataType>,
}

impl Store {
    /// Log `call` and fail it if a failure was registered for it.
    fn call(&mut self, call: String) -> Result<(), ClientError> {
        let failure = self.failures.get(&call).cloned();
        self.calls.push(call);
        match failure {
            Some((status, message)) => Err(ClientError::api(status, message)),
            None => Ok(()),
        }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn not_found() -> ClientError {
    ClientError::api(404, r#"{"detail":"Not found."}"#)
}

fn lookup<K: Ord, V: Clone>(map: &BTreeMap<K, V>, key: &K) -> Result<V, ClientError> {
    map.get(key).cloned().ok_or_else(not_found)
}

fn replace<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, value: V) -> Result<(), ClientError> {
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(not_found()),
    }
}

fn remove<K: Ord, V>(map: &mut BTreeMap<K, V>, key: &K) -> Result<(), ClientError> {
    map.remove(key).map(|_| ()).ok_or_else(not_found)
}

/// A [`MayanClient`](crate::client::MayanClient) that keeps everything in
/// memory.
///
/// Ids are assigned from a single counter starting at 1. Every call is
/// appended to a log as `name(args)`, e.g. `remove_group_user(1, 1)`, so tests
/// can assert exact call order. [`fail_on`](Self::fail_on) makes a given call
/// answer with an API error.
#[derive(Default)]
pub struct FakeMayan {
    store: Mutex<Store>,
}

impl FakeMayan {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.store().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.store().calls.clear();
    }

    /// Answer `call` (as it appears in the log) with `status` and `body`.
    pub fn fail_on(&self, call: impl Into<String>, status: u16, body: impl Into<String>) {
        self.store()
            .failures
            .insert(call.into(), (status, body.into()));
    }

    /// Current members of a group, bypassing the call log.
    pub fn group_members(&self, group_id: i64) -> BTreeSet<i64> {
        self.store()
            .group_users
            .get(&group_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite a stored source, bypassing the call log.
    pub fn put_source(&self, source: Source) {
        let mut store = self.store();
        store.last_id = store.last_id.max(source.id);
        store.sources.insert(source.id, source);
    }
}

#[async_trait]
impl DocumentTypeApi for FakeMayan {
    async fn create_document_type(
        &self,
        document_type: &DocumentType,
    ) -> Result<DocumentType, ClientError> {
        let mut store = self.store();
        store.call("create_document_type".into())?;
        let created = DocumentType {
            id: store.next_id(),
            ..document_type.clone()
        };
        store.document_types.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_document_type(&self, id: i64) -> Result<DocumentType, ClientError> {
        let mut store = self.store();
        store.call(format!("get_document_type({})", id))?;
        lookup(&store.document_types, &id)
    }

    async fn update_document_type(
        &self,
        document_type: &DocumentType,
    ) -> Result<DocumentType, ClientError> {
        let mut store = self.store();
        store.call(format!("update_document_type({})", document_type.id))?;
        replace(&mut store.document_types, document_type.id, document_type.clone())?;
        Ok(document_type.clone())
    }

    async fn delete_document_type(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_document_type({})", id))?;
        remove(&mut store.document_types, &id)
    }

    async fn find_document_type_by_label(
        &self,
        label: &str,
    ) -> Result<Option<DocumentType>, ClientError> {
        let mut store = self.store();
        store.call(format!("find_document_type_by_label({})", label))?;
        Ok(store
            .document_types
            .values()
            .find(|d| d.label == label)
            .cloned())
    }
}

#[async_trait]
impl SourceApi for FakeMayan {
    async fn create_source(&self, source: &Source) -> Result<Source, ClientError> {
        let mut store = self.store();
        store.call("create_source".into())?;
        let created = Source {
            id: store.next_id(),
            ..source.clone()
        };
        store.sources.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_source(&self, id: i64) -> Result<Source, ClientError> {
        let mut store = self.store();
        store.call(format!("get_source({})", id))?;
        lookup(&store.sources, &id)
    }

    async fn update_source(&self, source: &Source) -> Result<Source, ClientError> {
        let mut store = self.store();
        store.call(format!("update_source({})", source.id))?;
        replace(&mut store.sources, source.id, source.clone())?;
        Ok(source.clone())
    }

    async fn delete_source(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_source({})", id))?;
        remove(&mut store.sources, &id)
    }
}

#[async_trait]
impl TagApi for FakeMayan {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag, ClientError> {
        let mut store = self.store();
        store.call("create_tag".into())?;
        let created = Tag {
            id: store.next_id(),
            ..tag.clone()
        };
        store.tags.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_tag(&self, id: i64) -> Result<Tag, ClientError> {
        let mut store = self.store();
        store.call(format!("get_tag({})", id))?;
        lookup(&store.tags, &id)
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag, ClientError> {
        let mut store = self.store();
        store.call(format!("update_tag({})", tag.id))?;
        replace(&mut store.tags, tag.id, tag.clone())?;
        Ok(tag.clone())
    }

    async fn delete_tag(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_tag({})", id))?;
        remove(&mut store.tags, &id)
    }
}

#[async_trait]
impl IndexTemplateApi for FakeMayan {
    /// Creating a template also creates its root node, as the server does.
    async fn create_index_template(
        &self,
        template: &IndexTemplate,
    ) -> Result<IndexTemplate, ClientError> {
        let mut store = self.store();
        store.call("create_index_template".into())?;
        let id = store.next_id();
        let root_node_id = store.next_id();
        let created = IndexTemplate {
            id,
            root_node_id,
            ..template.clone()
        };
        store.index_templates.insert(id, created.clone());
        store.index_nodes.insert(
            (id, root_node_id),
            IndexTemplateNode {
                id: root_node_id,
                expression: String::new(),
                enabled: true,
                link_documents: false,
                index_id: id,
                parent_id: 0,
                parent: 0,
            },
        );
        Ok(created)
    }

    async fn get_index_template(&self, id: i64) -> Result<IndexTemplate, ClientError> {
        let mut store = self.store();
        store.call(format!("get_index_template({})", id))?;
        lookup(&store.index_templates, &id)
    }

    async fn update_index_template(
        &self,
        template: &IndexTemplate,
    ) -> Result<IndexTemplate, ClientError> {
        let mut store = self.store();
        store.call(format!("update_index_template({})", template.id))?;
        let current = lookup(&store.index_templates, &template.id)?;
        let updated = IndexTemplate {
            root_node_id: current.root_node_id,
            ..template.clone()
        };
        store.index_templates.insert(template.id, updated.clone());
        Ok(updated)
    }

    async fn delete_index_template(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_index_template({})", id))?;
        remove(&mut store.index_templates, &id)?;
        store.index_nodes.retain(|(index_id, _), _| *index_id != id);
        store.index_document_types.remove(&id);
        Ok(())
    }

    async fn index_template_document_types(
        &self,
        index_id: i64,
    ) -> Result<Vec<i64>, ClientError> {
        let mut store = self.store();
        store.call(format!("index_template_document_types({})", index_id))?;
        lookup(&store.index_templates, &index_id)?;
        Ok(store
            .index_document_types
            .get(&index_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "add_index_template_document_type({}, {})",
            index_id, document_type_id
        ))?;
        store
            .index_document_types
            .entry(index_id)
            .or_default()
            .insert(document_type_id);
        Ok(())
    }

    async fn remove_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "remove_index_template_document_type({}, {})",
            index_id, document_type_id
        ))?;
        if let Some(members) = store.index_document_types.get_mut(&index_id) {
            members.remove(&document_type_id);
        }
        Ok(())
    }

    async fn create_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError> {
        let mut store = self.store();
        store.call(format!("create_index_template_node({})", node.index_id))?;
        lookup(&store.index_templates, &node.index_id)?;
        let created = IndexTemplateNode {
            id: store.next_id(),
            ..node.clone()
        };
        store
            .index_nodes
            .insert((node.index_id, created.id), created.clone());
        Ok(created)
    }

    async fn get_index_template_node(
        &self,
        index_id: i64,
        node_id: i64,
    ) -> Result<IndexTemplateNode, ClientError> {
        let mut store = self.store();
        store.call(format!("get_index_template_node({}, {})", index_id, node_id))?;
        lookup(&store.index_nodes, &(index_id, node_id))
    }

    async fn update_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError> {
        let mut store = self.store();
        store.call(format!(
            "update_index_template_node({}, {})",
            node.index_id, node.id
        ))?;
        replace(&mut store.index_nodes, (node.index_id, node.id), node.clone())?;
        Ok(node.clone())
    }

    async fn delete_index_template_node(
        &self,
        index_id: i64,
        node_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "delete_index_template_node({}, {})",
            index_id, node_id
        ))?;
        remove(&mut store.index_nodes, &(index_id, node_id))
    }
}

#[async_trait]
impl GroupApi for FakeMayan {
    async fn create_group(&self, group: &Group) -> Result<Group, ClientError> {
        let mut store = self.store();
        store.call("create_group".into())?;
        let created = Group {
            id: store.next_id(),
            ..group.clone()
        };
        store.groups.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_group(&self, id: i64) -> Result<Group, ClientError> {
        let mut store = self.store();
        store.call(format!("get_group({})", id))?;
        lookup(&store.groups, &id)
    }

    async fn update_group(&self, group: &Group) -> Result<Group, ClientError> {
        let mut store = self.store();
        store.call(format!("update_group({})", group.id))?;
        replace(&mut store.groups, group.id, group.clone())?;
        Ok(group.clone())
    }

    async fn delete_group(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_group({})", id))?;
        remove(&mut store.groups, &id)?;
        store.group_users.remove(&id);
        Ok(())
    }

    async fn group_users(&self, group_id: i64) -> Result<Vec<i64>, ClientError> {
        let mut store = self.store();
        store.call(format!("group_users({})", group_id))?;
        lookup(&store.groups, &group_id)?;
        Ok(store
            .group_users
            .get(&group_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("add_group_user({}, {})", group_id, user_id))?;
        store.group_users.entry(group_id).or_default().insert(user_id);
        Ok(())
    }

    async fn remove_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("remove_group_user({}, {})", group_id, user_id))?;
        if let Some(members) = store.group_users.get_mut(&group_id) {
            members.remove(&user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl RoleApi for FakeMayan {
    async fn create_role(&self, role: &Role) -> Result<Role, ClientError> {
        let mut store = self.store();
        store.call("create_role".into())?;
        let created = Role {
            id: store.next_id(),
            ..role.clone()
        };
        store.roles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_role(&self, id: i64) -> Result<Role, ClientError> {
        let mut store = self.store();
        store.call(format!("get_role({})", id))?;
        lookup(&store.roles, &id)
    }

    async fn update_role(&self, role: &Role) -> Result<Role, ClientError> {
        let mut store = self.store();
        store.call(format!("update_role({})", role.id))?;
        replace(&mut store.roles, role.id, role.clone())?;
        Ok(role.clone())
    }

    async fn delete_role(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_role({})", id))?;
        remove(&mut store.roles, &id)?;
        store.role_groups.remove(&id);
        store.role_permissions.remove(&id);
        Ok(())
    }

    async fn role_groups(&self, role_id: i64) -> Result<Vec<i64>, ClientError> {
        let mut store = self.store();
        store.call(format!("role_groups({})", role_id))?;
        lookup(&store.roles, &role_id)?;
        Ok(store
            .role_groups
            .get(&role_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("add_role_group({}, {})", role_id, group_id))?;
        store.role_groups.entry(role_id).or_default().insert(group_id);
        Ok(())
    }

    async fn remove_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("remove_role_group({}, {})", role_id, group_id))?;
        if let Some(members) = store.role_groups.get_mut(&role_id) {
            members.remove(&group_id);
        }
        Ok(())
    }

    async fn role_permissions(&self, role_id: i64) -> Result<Vec<String>, ClientError> {
        let mut store = self.store();
        store.call(format!("role_permissions({})", role_id))?;
        lookup(&store.roles, &role_id)?;
        Ok(store
            .role_permissions
            .get(&role_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_role_permission(
        &self,
        role_id: i64,
        permission: &str,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("add_role_permission({}, {})", role_id, permission))?;
        store
            .role_permissions
            .entry(role_id)
            .or_default()
            .insert(permission.to_string());
        Ok(())
    }

    async fn remove_role_permission(
        &self,
        role_id: i64,
        permission: &str,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("remove_role_permission({}, {})", role_id, permission))?;
        if let Some(members) = store.role_permissions.get_mut(&role_id) {
            members.remove(permission);
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowTemplateApi for FakeMayan {
    async fn create_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError> {
        let mut store = self.store();
        store.call("create_workflow_template".into())?;
        let created = WorkflowTemplate {
            id: store.next_id(),
            ..template.clone()
        };
        store.workflow_templates.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_workflow_template(&self, id: i64) -> Result<WorkflowTemplate, ClientError> {
        let mut store = self.store();
        store.call(format!("get_workflow_template({})", id))?;
        lookup(&store.workflow_templates, &id)
    }

    async fn update_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError> {
        let mut store = self.store();
        store.call(format!("update_workflow_template({})", template.id))?;
        replace(&mut store.workflow_templates, template.id, template.clone())?;
        Ok(template.clone())
    }

    async fn delete_workflow_template(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_workflow_template({})", id))?;
        remove(&mut store.workflow_templates, &id)?;
        store.workflow_document_types.remove(&id);
        store.states.retain(|(workflow_id, _), _| *workflow_id != id);
        store.transitions.retain(|(workflow_id, _), _| *workflow_id != id);
        Ok(())
    }

    async fn workflow_template_document_types(
        &self,
        workflow_id: i64,
    ) -> Result<Vec<i64>, ClientError> {
        let mut store = self.store();
        store.call(format!("workflow_template_document_types({})", workflow_id))?;
        lookup(&store.workflow_templates, &workflow_id)?;
        Ok(store
            .workflow_document_types
            .get(&workflow_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "add_workflow_template_document_type({}, {})",
            workflow_id, document_type_id
        ))?;
        store
            .workflow_document_types
            .entry(workflow_id)
            .or_default()
            .insert(document_type_id);
        Ok(())
    }

    async fn remove_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "remove_workflow_template_document_type({}, {})",
            workflow_id, document_type_id
        ))?;
        if let Some(members) = store.workflow_document_types.get_mut(&workflow_id) {
            members.remove(&document_type_id);
        }
        Ok(())
    }

    async fn create_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError> {
        let mut store = self.store();
        store.call(format!("create_workflow_template_state({})", workflow_id))?;
        lookup(&store.workflow_templates, &workflow_id)?;
        let created = WorkflowTemplateState {
            id: store.next_id(),
            ..state.clone()
        };
        store.states.insert((workflow_id, created.id), created.clone());
        Ok(created)
    }

    async fn get_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<WorkflowTemplateState, ClientError> {
        let mut store = self.store();
        store.call(format!(
            "get_workflow_template_state({}, {})",
            workflow_id, state_id
        ))?;
        lookup(&store.states, &(workflow_id, state_id))
    }

    async fn update_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError> {
        let mut store = self.store();
        store.call(format!(
            "update_workflow_template_state({}, {})",
            workflow_id, state.id
        ))?;
        replace(&mut store.states, (workflow_id, state.id), state.clone())?;
        Ok(state.clone())
    }

    async fn delete_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "delete_workflow_template_state({}, {})",
            workflow_id, state_id
        ))?;
        remove(&mut store.states, &(workflow_id, state_id))
    }

    async fn create_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        let mut store = self.store();
        store.call(format!("create_workflow_template_transition({})", workflow_id))?;
        lookup(&store.workflow_templates, &workflow_id)?;
        let created = WorkflowTemplateTransition {
            id: store.next_id(),
            ..transition.clone()
        };
        store
            .transitions
            .insert((workflow_id, created.id), created.clone());
        Ok(created)
    }

    async fn get_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        let mut store = self.store();
        store.call(format!(
            "get_workflow_template_transition({}, {})",
            workflow_id, transition_id
        ))?;
        lookup(&store.transitions, &(workflow_id, transition_id))
    }

    async fn update_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        let mut store = self.store();
        store.call(format!(
            "update_workflow_template_transition({}, {})",
            workflow_id, transition.id
        ))?;
        replace(
            &mut store.transitions,
            (workflow_id, transition.id),
            transition.clone(),
        )?;
        Ok(transition.clone())
    }

    async fn delete_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!(
            "delete_workflow_template_transition({}, {})",
            workflow_id, transition_id
        ))?;
        remove(&mut store.transitions, &(workflow_id, transition_id))
    }
}

#[async_trait]
impl MetadataTypeApi for FakeMayan {
    async fn create_metadata_type(
        &self,
        metadata_type: &MetadataType,
    ) -> Result<MetadataType, ClientError> {
        let mut store = self.store();
        store.call("create_metadata_type".into())?;
        let created = MetadataType {
            id: store.next_id(),
            ..metadata_type.clone()
        };
        store.metadata_types.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_metadata_type(&self, id: i64) -> Result<MetadataType, ClientError> {
        let mut store = self.store();
        store.call(format!("get_metadata_type({})", id))?;
        lookup(&store.metadata_types, &id)
    }

    async fn update_metadata_type(
        &self,
        metadata_type: &MetadataType,
    ) -> Result<MetadataType, ClientError> {
        let mut store = self.store();
        store.call(format!("update_metadata_type({})", metadata_type.id))?;
        replace(&mut store.metadata_types, metadata_type.id, metadata_type.clone())?;
        Ok(metadata_type.clone())
    }

    async fn delete_metadata_type(&self, id: i64) -> Result<(), ClientError> {
        let mut store = self.store();
        store.call(format!("delete_metadata_type({})", id))?;
        remove(&mut store.metadata_types, &id)
    }

    async fn find_metadata_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MetadataType>, ClientError> {
        let mut store = self.store();
        store.call(format!("find_metadata_type_by_name({})", name))?;
        Ok(store
            .metadata_types
            .values()
            .find(|m| m.name == name)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_and_call_log() {
        let fake = FakeMayan::new();
        let tag = fake
            .create_tag(&Tag {
                label: "urgent".into(),
                color: "#ff0000".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tag.id, 1);

        fake.get_tag(1).await.unwrap();
        assert!(fake.get_tag(2).await.unwrap_err().is_not_found());
        assert_eq!(fake.calls(), vec!["create_tag", "get_tag(1)", "get_tag(2)"]);
    }

    #[tokio::test]
    async fn test_fail_on() {
        let fake = FakeMayan::new();
        fake.fail_on("add_group_user(1, 5)", 400, "no such user");

        let err = fake.add_group_user(1, 5).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
        assert!(fake.add_group_user(1, 6).await.is_ok());
        assert_eq!(fake.group_members(1), BTreeSet::from([6]));
    }

    #[tokio::test]
    async fn test_index_template_gets_root_node() {
        let fake = FakeMayan::new();
        let template = fake
            .create_index_template(&IndexTemplate {
                label: "By type".into(),
                slug: "by-type".into(),
                enabled: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let root = fake
            .get_index_template_node(template.id, template.root_node_id)
            .await
            .unwrap();
        assert_eq!(root.index_id, template.id);
    }
}
