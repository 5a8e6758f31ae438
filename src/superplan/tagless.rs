//! AWS resource types that do not accept `tags` / `tags_all`.
//!
//! Generated offline from `terraform providers schema -json` by selecting
//! resource schemas where both attributes are absent; regenerate against
//! the pinned provider version when it changes. Sorted so membership is a
//! binary search.

pub fn is_tagless(resource_type: &str) -> bool {
    TAGLESS_AWS_TYPES.binary_search(&resource_type).is_ok()
}

pub static TAGLESS_AWS_TYPES: &[&str] = &[
    "aws_accessanalyzer_archive_rule",
    "aws_account_alternate_contact",
    "aws_account_primary_contact",
    "aws_account_region",
    "aws_acm_certificate_validation",
    "aws_acmpca_certificate",
    "aws_acmpca_certificate_authority_certificate",
    "aws_acmpca_permission",
    "aws_acmpca_policy",
    "aws_alb_listener_certificate",
    "aws_alb_target_group_attachment",
    "aws_ami_launch_permission",
    "aws_amplify_backend_environment",
    "aws_amplify_domain_association",
    "aws_amplify_webhook",
    "aws_api_gateway_account",
    "aws_api_gateway_authorizer",
    "aws_api_gateway_base_path_mapping",
    "aws_api_gateway_deployment",
    "aws_api_gateway_documentation_part",
    "aws_api_gateway_documentation_version",
    "aws_api_gateway_gateway_response",
    "aws_api_gateway_integration",
    "aws_api_gateway_integration_response",
    "aws_api_gateway_method",
    "aws_api_gateway_method_response",
    "aws_api_gateway_method_settings",
    "aws_api_gateway_model",
    "aws_api_gateway_request_validator",
    "aws_api_gateway_resource",
    "aws_api_gateway_rest_api_policy",
    "aws_api_gateway_rest_api_put",
    "aws_api_gateway_usage_plan_key",
    "aws_apigatewayv2_api_mapping",
    "aws_apigatewayv2_authorizer",
    "aws_apigatewayv2_deployment",
    "aws_apigatewayv2_integration",
    "aws_apigatewayv2_integration_response",
    "aws_apigatewayv2_model",
    "aws_apigatewayv2_route",
    "aws_apigatewayv2_route_response",
    "aws_app_cookie_stickiness_policy",
    "aws_appautoscaling_policy",
    "aws_appautoscaling_scheduled_action",
    "aws_appconfig_extension_association",
    "aws_appconfig_hosted_configuration_version",
    "aws_appfabric_app_authorization_connection",
    "aws_appflow_connector_profile",
    "aws_apprunner_custom_domain_association",
    "aws_apprunner_default_auto_scaling_configuration_version",
    "aws_apprunner_deployment",
    "aws_appstream_directory_config",
    "aws_appstream_fleet_stack_association",
    "aws_appstream_user",
    "aws_appstream_user_stack_association",
    "aws_appsync_api_cache",
    "aws_appsync_api_key",
    "aws_appsync_datasource",
    "aws_appsync_domain_name",
    "aws_appsync_domain_name_api_association",
    "aws_appsync_function",
    "aws_appsync_resolver",
    "aws_appsync_source_api_association",
    "aws_appsync_type",
    "aws_athena_database",
    "aws_athena_named_query",
    "aws_athena_prepared_statement",
    "aws_auditmanager_account_registration",
    "aws_auditmanager_assessment_delegation",
    "aws_auditmanager_assessment_report",
    "aws_auditmanager_framework_share",
    "aws_auditmanager_organization_admin_account_registration",
    "aws_autoscaling_attachment",
    "aws_autoscaling_group",
    "aws_autoscaling_group_tag",
    "aws_autoscaling_lifecycle_hook",
    "aws_autoscaling_notification",
    "aws_autoscaling_policy",
    "aws_autoscaling_schedule",
    "aws_autoscaling_traffic_source_attachment",
    "aws_autoscalingplans_scaling_plan",
    "aws_backup_global_settings",
    "aws_backup_region_settings",
    "aws_backup_restore_testing_selection",
    "aws_backup_selection",
    "aws_backup_vault_lock_configuration",
    "aws_backup_vault_notifications",
    "aws_backup_vault_policy",
    "aws_bedrock_guardrail_version",
    "aws_bedrock_model_invocation_logging_configuration",
    "aws_bedrockagent_agent_action_group",
    "aws_bedrockagent_agent_collaborator",
    "aws_bedrockagent_agent_knowledge_base_association",
    "aws_bedrockagent_data_source",
    "aws_ce_cost_allocation_tag",
    "aws_chime_voice_connector_group",
    "aws_chime_voice_connector_logging",
    "aws_chime_voice_connector_origination",
    "aws_chime_voice_connector_streaming",
    "aws_chime_voice_connector_termination",
    "aws_chime_voice_connector_termination_credentials",
    "aws_chimesdkvoice_global_settings",
    "aws_chimesdkvoice_sip_rule",
    "aws_cloud9_environment_membership",
    "aws_cloudcontrolapi_resource",
    "aws_cloudformation_stack_instances",
    "aws_cloudformation_stack_set_instance",
    "aws_cloudformation_type",
    "aws_cloudfront_cache_policy",
    "aws_cloudfront_continuous_deployment_policy",
    "aws_cloudfront_field_level_encryption_config",
    "aws_cloudfront_field_level_encryption_profile",
    "aws_cloudfront_function",
    "aws_cloudfront_key_group",
    "aws_cloudfront_key_value_store",
    "aws_cloudfront_monitoring_subscription",
    "aws_cloudfront_origin_access_control",
    "aws_cloudfront_origin_access_identity",
    "aws_cloudfront_origin_request_policy",
    "aws_cloudfront_public_key",
    "aws_cloudfront_realtime_log_config",
    "aws_cloudfront_response_headers_policy",
    "aws_cloudfrontkeyvaluestore_key",
    "aws_cloudfrontkeyvaluestore_keys_exclusive",
    "aws_cloudhsm_v2_hsm",
    "aws_cloudsearch_domain",
    "aws_cloudsearch_domain_service_access_policy",
    "aws_cloudtrail_organization_delegated_admin_account",
    "aws_cloudwatch_dashboard",
    "aws_cloudwatch_event_api_destination",
    "aws_cloudwatch_event_archive",
    "aws_cloudwatch_event_bus_policy",
    "aws_cloudwatch_event_connection",
    "aws_cloudwatch_event_endpoint",
    "aws_cloudwatch_event_permission",
    "aws_cloudwatch_event_target",
    "aws_cloudwatch_log_account_policy",
    "aws_cloudwatch_log_data_protection_policy",
    "aws_cloudwatch_log_delivery_destination_policy",
    "aws_cloudwatch_log_destination_policy",
    "aws_cloudwatch_log_index_policy",
    "aws_cloudwatch_log_metric_filter",
    "aws_cloudwatch_log_resource_policy",
    "aws_cloudwatch_log_stream",
    "aws_cloudwatch_log_subscription_filter",
    "aws_cloudwatch_query_definition",
    "aws_codeartifact_domain_permissions_policy",
    "aws_codeartifact_repository_permissions_policy",
    "aws_codebuild_resource_policy",
    "aws_codebuild_source_credential",
    "aws_codebuild_webhook",
    "aws_codecatalyst_dev_environment",
    "aws_codecatalyst_project",
    "aws_codecatalyst_source_repository",
    "aws_codecommit_approval_rule_template",
    "aws_codecommit_approval_rule_template_association",
    "aws_codecommit_trigger",
    "aws_codedeploy_deployment_config",
    "aws_codestarconnections_host",
    "aws_cognito_identity_pool_provider_principal_tag",
    "aws_cognito_identity_pool_roles_attachment",
    "aws_cognito_identity_provider",
    "aws_cognito_log_delivery_configuration",
    "aws_cognito_managed_login_branding",
    "aws_cognito_managed_user_pool_client",
    "aws_cognito_resource_server",
    "aws_cognito_risk_configuration",
    "aws_cognito_user",
    "aws_cognito_user_group",
    "aws_cognito_user_in_group",
    "aws_cognito_user_pool_client",
    "aws_cognito_user_pool_domain",
    "aws_cognito_user_pool_ui_customization",
    "aws_computeoptimizer_enrollment_status",
    "aws_computeoptimizer_recommendation_preferences",
    "aws_config_configuration_recorder",
    "aws_config_configuration_recorder_status",
    "aws_config_conformance_pack",
    "aws_config_delivery_channel",
    "aws_config_organization_conformance_pack",
    "aws_config_organization_custom_policy_rule",
    "aws_config_organization_custom_rule",
    "aws_config_organization_managed_rule",
    "aws_config_remediation_configuration",
    "aws_config_retention_configuration",
    "aws_connect_bot_association",
    "aws_connect_instance_storage_config",
    "aws_connect_lambda_function_association",
    "aws_connect_phone_number_contact_flow_association",
    "aws_connect_user_hierarchy_structure",
    "aws_controltower_control",
    "aws_costoptimizationhub_enrollment_status",
    "aws_costoptimizationhub_preferences",
    "aws_customerprofiles_profile",
    "aws_dataexchange_event_action",
    "aws_datapipeline_pipeline_definition",
    "aws_datazone_asset_type",
    "aws_datazone_environment",
    "aws_datazone_environment_blueprint_configuration",
    "aws_datazone_environment_profile",
    "aws_datazone_form_type",
    "aws_datazone_glossary",
    "aws_datazone_glossary_term",
    "aws_datazone_project",
    "aws_datazone_user_profile",
    "aws_dax_parameter_group",
    "aws_dax_subnet_group",
    "aws_db_instance_automated_backups_replication",
    "aws_db_instance_role_association",
    "aws_db_proxy_default_target_group",
    "aws_db_proxy_target",
    "aws_detective_invitation_accepter",
    "aws_detective_member",
    "aws_detective_organization_admin_account",
    "aws_detective_organization_configuration",
    "aws_devicefarm_upload",
    "aws_devopsguru_event_sources_config",
    "aws_devopsguru_notification_channel",
    "aws_devopsguru_resource_collection",
    "aws_devopsguru_service_integration",
    "aws_directory_service_conditional_forwarder",
    "aws_directory_service_log_subscription",
    "aws_directory_service_radius_settings",
    "aws_directory_service_shared_directory",
    "aws_directory_service_shared_directory_accepter",
    "aws_directory_service_trust",
    "aws_docdb_cluster_snapshot",
    "aws_docdb_global_cluster",
    "aws_dsql_cluster_peering",
    "aws_dx_bgp_peer",
    "aws_dx_connection_association",
    "aws_dx_connection_confirmation",
    "aws_dx_gateway",
    "aws_dx_gateway_association",
    "aws_dx_gateway_association_proposal",
    "aws_dx_hosted_connection",
    "aws_dx_hosted_private_virtual_interface",
    "aws_dx_hosted_public_virtual_interface",
    "aws_dx_hosted_transit_virtual_interface",
    "aws_dx_macsec_key_association",
    "aws_dynamodb_contributor_insights",
    "aws_dynamodb_global_table",
    "aws_dynamodb_kinesis_streaming_destination",
    "aws_dynamodb_resource_policy",
    "aws_dynamodb_table_export",
    "aws_dynamodb_table_item",
    "aws_dynamodb_tag",
    "aws_ebs_default_kms_key",
    "aws_ebs_encryption_by_default",
    "aws_ebs_fast_snapshot_restore",
    "aws_ebs_snapshot_block_public_access",
    "aws_ec2_availability_zone_group",
    "aws_ec2_client_vpn_authorization_rule",
    "aws_ec2_client_vpn_network_association",
    "aws_ec2_client_vpn_route",
    "aws_ec2_default_credit_specification",
    "aws_ec2_image_block_public_access",
    "aws_ec2_instance_metadata_defaults",
    "aws_ec2_instance_state",
    "aws_ec2_local_gateway_route",
    "aws_ec2_managed_prefix_list_entry",
    "aws_ec2_serial_console_access",
    "aws_ec2_subnet_cidr_reservation",
    "aws_ec2_tag",
    "aws_ec2_traffic_mirror_filter_rule",
    "aws_ec2_transit_gateway_default_route_table_association",
    "aws_ec2_transit_gateway_default_route_table_propagation",
    "aws_ec2_transit_gateway_multicast_domain_association",
    "aws_ec2_transit_gateway_multicast_group_member",
    "aws_ec2_transit_gateway_multicast_group_source",
    "aws_ec2_transit_gateway_policy_table_association",
    "aws_ec2_transit_gateway_prefix_list_reference",
    "aws_ec2_transit_gateway_route",
    "aws_ec2_transit_gateway_route_table_association",
    "aws_ec2_transit_gateway_route_table_propagation",
    "aws_ecr_account_setting",
    "aws_ecr_lifecycle_policy",
    "aws_ecr_pull_through_cache_rule",
    "aws_ecr_registry_policy",
    "aws_ecr_registry_scanning_configuration",
    "aws_ecr_replication_configuration",
    "aws_ecr_repository_creation_template",
    "aws_ecr_repository_policy",
    "aws_ecrpublic_repository_policy",
    "aws_ecs_account_setting_default",
    "aws_ecs_cluster_capacity_providers",
    "aws_ecs_tag",
    "aws_efs_backup_policy",
    "aws_efs_file_system_policy",
    "aws_efs_mount_target",
    "aws_efs_replication_configuration",
    "aws_eip_association",
    "aws_eip_domain_name",
    "aws_eks_access_policy_association",
    "aws_elastic_beanstalk_configuration_template",
    "aws_elasticache_global_replication_group",
    "aws_elasticache_user_group_association",
    "aws_elasticsearch_domain_policy",
    "aws_elasticsearch_domain_saml_options",
    "aws_elasticsearch_vpc_endpoint",
    "aws_elastictranscoder_pipeline",
    "aws_elastictranscoder_preset",
    "aws_elb_attachment",
    "aws_emr_block_public_access_configuration",
    "aws_emr_instance_fleet",
    "aws_emr_instance_group",
    "aws_emr_managed_scaling_policy",
    "aws_emr_security_configuration",
    "aws_emr_studio_session_mapping",
    "aws_fms_admin_account",
    "aws_fsx_s3_access_point_attachment",
    "aws_glacier_vault_lock",
    "aws_globalaccelerator_custom_routing_endpoint_group",
    "aws_globalaccelerator_custom_routing_listener",
    "aws_globalaccelerator_endpoint_group",
    "aws_globalaccelerator_listener",
    "aws_glue_catalog_table",
    "aws_glue_catalog_table_optimizer",
    "aws_glue_classifier",
    "aws_glue_data_catalog_encryption_settings",
    "aws_glue_partition",
    "aws_glue_partition_index",
    "aws_glue_resource_policy",
    "aws_glue_security_configuration",
    "aws_glue_user_defined_function",
    "aws_grafana_license_association",
    "aws_grafana_role_association",
    "aws_grafana_workspace_api_key",
    "aws_grafana_workspace_saml_configuration",
    "aws_grafana_workspace_service_account",
    "aws_grafana_workspace_service_account_token",
    "aws_guardduty_detector_feature",
    "aws_guardduty_invite_accepter",
    "aws_guardduty_member",
    "aws_guardduty_member_detector_feature",
    "aws_guardduty_organization_admin_account",
    "aws_guardduty_organization_configuration",
    "aws_guardduty_organization_configuration_feature",
    "aws_guardduty_publishing_destination",
    "aws_iam_access_key",
    "aws_iam_account_alias",
    "aws_iam_account_password_policy",
    "aws_iam_group",
    "aws_iam_group_membership",
    "aws_iam_group_policies_exclusive",
    "aws_iam_group_policy",
    "aws_iam_group_policy_attachment",
    "aws_iam_group_policy_attachments_exclusive",
    "aws_iam_organizations_features",
    "aws_iam_policy_attachment",
    "aws_iam_role_policies_exclusive",
    "aws_iam_role_policy",
    "aws_iam_role_policy_attachment",
    "aws_iam_role_policy_attachments_exclusive",
    "aws_iam_security_token_service_preferences",
    "aws_iam_service_specific_credential",
    "aws_iam_signing_certificate",
    "aws_iam_user_group_membership",
    "aws_iam_user_login_profile",
    "aws_iam_user_policies_exclusive",
    "aws_iam_user_policy",
    "aws_iam_user_policy_attachment",
    "aws_iam_user_policy_attachments_exclusive",
    "aws_iam_user_ssh_key",
    "aws_identitystore_group",
    "aws_identitystore_group_membership",
    "aws_identitystore_user",
    "aws_inspector2_delegated_admin_account",
    "aws_inspector2_enabler",
    "aws_inspector2_member_association",
    "aws_inspector2_organization_configuration",
    "aws_inspector_assessment_target",
    "aws_internet_gateway_attachment",
    "aws_iot_certificate",
    "aws_iot_event_configurations",
    "aws_iot_indexing_configuration",
    "aws_iot_logging_options",
    "aws_iot_policy_attachment",
    "aws_iot_thing",
    "aws_iot_thing_group_membership",
    "aws_iot_thing_principal_attachment",
    "aws_iot_topic_rule_destination",
    "aws_kendra_experience",
    "aws_kinesis_resource_policy",
    "aws_kinesisanalyticsv2_application_snapshot",
    "aws_kms_alias",
    "aws_kms_ciphertext",
    "aws_kms_custom_key_store",
    "aws_kms_grant",
    "aws_kms_key_policy",
    "aws_lakeformation_data_cells_filter",
    "aws_lakeformation_data_lake_settings",
    "aws_lakeformation_lf_tag",
    "aws_lakeformation_lf_tag_expression",
    "aws_lakeformation_opt_in",
    "aws_lakeformation_permissions",
    "aws_lakeformation_resource",
    "aws_lakeformation_resource_lf_tag",
    "aws_lakeformation_resource_lf_tags",
    "aws_lambda_alias",
    "aws_lambda_function_event_invoke_config",
    "aws_lambda_function_recursion_config",
    "aws_lambda_function_url",
    "aws_lambda_invocation",
    "aws_lambda_layer_version",
    "aws_lambda_layer_version_permission",
    "aws_lambda_permission",
    "aws_lambda_provisioned_concurrency_config",
    "aws_lambda_runtime_management_config",
    "aws_launch_configuration",
    "aws_lb_cookie_stickiness_policy",
    "aws_lb_listener_certificate",
    "aws_lb_ssl_negotiation_policy",
    "aws_lb_target_group_attachment",
    "aws_lb_trust_store_revocation",
    "aws_lex_bot",
    "aws_lex_bot_alias",
    "aws_lex_intent",
    "aws_lex_slot_type",
    "aws_lexv2models_bot_locale",
    "aws_lexv2models_bot_version",
    "aws_lexv2models_intent",
    "aws_lexv2models_slot",
    "aws_lexv2models_slot_type",
    "aws_licensemanager_association",
    "aws_licensemanager_grant",
    "aws_licensemanager_grant_accepter",
    "aws_lightsail_bucket_access_key",
    "aws_lightsail_bucket_resource_access",
    "aws_lightsail_container_service_deployment_version",
    "aws_lightsail_disk_attachment",
    "aws_lightsail_domain",
    "aws_lightsail_domain_entry",
    "aws_lightsail_instance_public_ports",
    "aws_lightsail_lb_attachment",
    "aws_lightsail_lb_certificate",
    "aws_lightsail_lb_certificate_attachment",
    "aws_lightsail_lb_https_redirection_policy",
    "aws_lightsail_lb_stickiness_policy",
    "aws_lightsail_static_ip",
    "aws_lightsail_static_ip_attachment",
    "aws_load_balancer_backend_server_policy",
    "aws_load_balancer_listener_policy",
    "aws_load_balancer_policy",
    "aws_location_tracker_association",
    "aws_m2_deployment",
    "aws_macie2_account",
    "aws_macie2_classification_export_configuration",
    "aws_macie2_invitation_accepter",
    "aws_macie2_organization_admin_account",
    "aws_macie2_organization_configuration",
    "aws_main_route_table_association",
    "aws_media_store_container_policy",
    "aws_medialive_multiplex_program",
    "aws_msk_cluster_policy",
    "aws_msk_configuration",
    "aws_msk_scram_secret_association",
    "aws_msk_single_scram_secret_association",
    "aws_nat_gateway_eip_association",
    "aws_neptune_cluster_snapshot",
    "aws_neptune_global_cluster",
    "aws_network_acl_association",
    "aws_network_acl_rule",
    "aws_network_interface_attachment",
    "aws_network_interface_permission",
    "aws_network_interface_sg_attachment",
    "aws_networkfirewall_firewall_transit_gateway_attachment_accepter",
    "aws_networkfirewall_logging_configuration",
    "aws_networkfirewall_resource_policy",
    "aws_networkmanager_attachment_accepter",
    "aws_networkmanager_core_network_policy_attachment",
    "aws_networkmanager_customer_gateway_association",
    "aws_networkmanager_link_association",
    "aws_networkmanager_transit_gateway_connect_peer_association",
    "aws_networkmanager_transit_gateway_registration",
    "aws_notifications_channel_association",
    "aws_notifications_event_rule",
    "aws_notifications_notification_hub",
    "aws_oam_sink_policy",
    "aws_opensearch_authorize_vpc_endpoint_access",
    "aws_opensearch_domain_policy",
    "aws_opensearch_domain_saml_options",
    "aws_opensearch_inbound_connection_accepter",
    "aws_opensearch_outbound_connection",
    "aws_opensearch_package",
    "aws_opensearch_package_association",
    "aws_opensearch_vpc_endpoint",
    "aws_opensearchserverless_access_policy",
    "aws_opensearchserverless_lifecycle_policy",
    "aws_opensearchserverless_security_config",
    "aws_opensearchserverless_security_policy",
    "aws_opensearchserverless_vpc_endpoint",
    "aws_organizations_delegated_administrator",
    "aws_organizations_organization",
    "aws_organizations_policy_attachment",
    "aws_paymentcryptography_key_alias",
    "aws_pinpoint_adm_channel",
    "aws_pinpoint_apns_channel",
    "aws_pinpoint_apns_sandbox_channel",
    "aws_pinpoint_apns_voip_channel",
    "aws_pinpoint_apns_voip_sandbox_channel",
    "aws_pinpoint_baidu_channel",
    "aws_pinpoint_email_channel",
    "aws_pinpoint_event_stream",
    "aws_pinpoint_gcm_channel",
    "aws_pinpoint_sms_channel",
    "aws_prometheus_alert_manager_definition",
    "aws_prometheus_query_logging_configuration",
    "aws_prometheus_resource_policy",
    "aws_prometheus_workspace_configuration",
    "aws_proxy_protocol_policy",
    "aws_quicksight_account_settings",
    "aws_quicksight_account_subscription",
    "aws_quicksight_folder_membership",
    "aws_quicksight_group",
    "aws_quicksight_group_membership",
    "aws_quicksight_iam_policy_assignment",
    "aws_quicksight_ingestion",
    "aws_quicksight_ip_restriction",
    "aws_quicksight_key_registration",
    "aws_quicksight_refresh_schedule",
    "aws_quicksight_role_custom_permission",
    "aws_quicksight_role_membership",
    "aws_quicksight_template_alias",
    "aws_quicksight_user",
    "aws_quicksight_user_custom_permission",
    "aws_ram_principal_association",
    "aws_ram_resource_association",
    "aws_ram_resource_share_accepter",
    "aws_ram_sharing_with_organization",
    "aws_rds_certificate",
    "aws_rds_cluster_activity_stream",
    "aws_rds_cluster_role_association",
    "aws_rds_export_task",
    "aws_rds_instance_state",
    "aws_redshift_authentication_profile",
    "aws_redshift_cluster_iam_roles",
    "aws_redshift_data_share_authorization",
    "aws_redshift_data_share_consumer_association",
    "aws_redshift_endpoint_access",
    "aws_redshift_endpoint_authorization",
    "aws_redshift_logging",
    "aws_redshift_partner",
    "aws_redshift_resource_policy",
    "aws_redshift_scheduled_action",
    "aws_redshift_snapshot_copy",
    "aws_redshift_snapshot_schedule_association",
    "aws_redshiftdata_statement",
    "aws_redshiftserverless_custom_domain_association",
    "aws_redshiftserverless_endpoint_access",
    "aws_redshiftserverless_resource_policy",
    "aws_redshiftserverless_snapshot",
    "aws_redshiftserverless_usage_limit",
    "aws_resourcegroups_resource",
    "aws_route",
    "aws_route53_cidr_collection",
    "aws_route53_cidr_location",
    "aws_route53_delegation_set",
    "aws_route53_hosted_zone_dnssec",
    "aws_route53_key_signing_key",
    "aws_route53_query_log",
    "aws_route53_record",
    "aws_route53_records_exclusive",
    "aws_route53_resolver_config",
    "aws_route53_resolver_dnssec_config",
    "aws_route53_resolver_firewall_config",
    "aws_route53_resolver_firewall_rule",
    "aws_route53_resolver_query_log_config_association",
    "aws_route53_resolver_rule_association",
    "aws_route53_traffic_policy",
    "aws_route53_traffic_policy_instance",
    "aws_route53_vpc_association_authorization",
    "aws_route53_zone_association",
    "aws_route53domains_delegation_signer_record",
    "aws_route53profiles_resource_association",
    "aws_route53recoverycontrolconfig_routing_control",
    "aws_route_table_association",
    "aws_rum_metrics_destination",
    "aws_s3_account_public_access_block",
    "aws_s3_bucket_accelerate_configuration",
    "aws_s3_bucket_acl",
    "aws_s3_bucket_analytics_configuration",
    "aws_s3_bucket_cors_configuration",
    "aws_s3_bucket_intelligent_tiering_configuration",
    "aws_s3_bucket_inventory",
    "aws_s3_bucket_lifecycle_configuration",
    "aws_s3_bucket_logging",
    "aws_s3_bucket_metadata_configuration",
    "aws_s3_bucket_metric",
    "aws_s3_bucket_notification",
    "aws_s3_bucket_object_lock_configuration",
    "aws_s3_bucket_ownership_controls",
    "aws_s3_bucket_policy",
    "aws_s3_bucket_public_access_block",
    "aws_s3_bucket_replication_configuration",
    "aws_s3_bucket_request_payment_configuration",
    "aws_s3_bucket_server_side_encryption_configuration",
    "aws_s3_bucket_versioning",
    "aws_s3_bucket_website_configuration",
    "aws_s3control_access_grants_instance_resource_policy",
    "aws_s3control_access_point_policy",
    "aws_s3control_bucket_lifecycle_configuration",
    "aws_s3control_bucket_policy",
    "aws_s3control_directory_bucket_access_point_scope",
    "aws_s3control_multi_region_access_point",
    "aws_s3control_multi_region_access_point_policy",
    "aws_s3control_object_lambda_access_point",
    "aws_s3control_object_lambda_access_point_policy",
    "aws_s3outposts_endpoint",
    "aws_s3tables_namespace",
    "aws_s3tables_table",
    "aws_s3tables_table_bucket",
    "aws_s3tables_table_bucket_policy",
    "aws_s3tables_table_policy",
    "aws_sagemaker_device",
    "aws_sagemaker_image_version",
    "aws_sagemaker_model_package_group_policy",
    "aws_sagemaker_servicecatalog_portfolio_status",
    "aws_sagemaker_workforce",
    "aws_scheduler_schedule",
    "aws_schemas_registry_policy",
    "aws_secretsmanager_secret_policy",
    "aws_secretsmanager_secret_rotation",
    "aws_secretsmanager_secret_version",
    "aws_security_group_rule",
    "aws_securityhub_account",
    "aws_securityhub_action_target",
    "aws_securityhub_configuration_policy",
    "aws_securityhub_configuration_policy_association",
    "aws_securityhub_finding_aggregator",
    "aws_securityhub_insight",
    "aws_securityhub_invite_accepter",
    "aws_securityhub_member",
    "aws_securityhub_organization_admin_account",
    "aws_securityhub_organization_configuration",
    "aws_securityhub_product_subscription",
    "aws_securityhub_standards_control",
    "aws_securityhub_standards_control_association",
    "aws_securityhub_standards_subscription",
    "aws_securitylake_aws_log_source",
    "aws_securitylake_custom_log_source",
    "aws_securitylake_subscriber_notification",
    "aws_service_discovery_instance",
    "aws_servicecatalog_budget_resource_association",
    "aws_servicecatalog_constraint",
    "aws_servicecatalog_organizations_access",
    "aws_servicecatalog_portfolio_share",
    "aws_servicecatalog_principal_portfolio_association",
    "aws_servicecatalog_product_portfolio_association",
    "aws_servicecatalog_provisioning_artifact",
    "aws_servicecatalog_service_action",
    "aws_servicecatalog_tag_option",
    "aws_servicecatalog_tag_option_resource_association",
    "aws_servicecatalogappregistry_attribute_group_association",
    "aws_servicequotas_service_quota",
    "aws_servicequotas_template",
    "aws_servicequotas_template_association",
    "aws_ses_active_receipt_rule_set",
    "aws_ses_configuration_set",
    "aws_ses_domain_dkim",
    "aws_ses_domain_identity",
    "aws_ses_domain_identity_verification",
    "aws_ses_domain_mail_from",
    "aws_ses_email_identity",
    "aws_ses_event_destination",
    "aws_ses_identity_notification_topic",
    "aws_ses_identity_policy",
    "aws_ses_receipt_filter",
    "aws_ses_receipt_rule",
    "aws_ses_receipt_rule_set",
    "aws_ses_template",
    "aws_sesv2_account_suppression_attributes",
    "aws_sesv2_account_vdm_attributes",
    "aws_sesv2_configuration_set_event_destination",
    "aws_sesv2_dedicated_ip_assignment",
    "aws_sesv2_email_identity_feedback_attributes",
    "aws_sesv2_email_identity_mail_from_attributes",
    "aws_sesv2_email_identity_policy",
    "aws_sfn_alias",
    "aws_shield_application_layer_automatic_response",
    "aws_shield_drt_access_log_bucket_association",
    "aws_shield_drt_access_role_arn_association",
    "aws_shield_proactive_engagement",
    "aws_shield_protection_health_check_association",
    "aws_shield_subscription",
    "aws_signer_signing_job",
    "aws_signer_signing_profile_permission",
    "aws_snapshot_create_volume_permission",
    "aws_sns_platform_application",
    "aws_sns_sms_preferences",
    "aws_sns_topic_data_protection_policy",
    "aws_sns_topic_policy",
    "aws_sns_topic_subscription",
    "aws_spot_datafeed_subscription",
    "aws_sqs_queue_policy",
    "aws_sqs_queue_redrive_allow_policy",
    "aws_sqs_queue_redrive_policy",
    "aws_ssm_default_patch_baseline",
    "aws_ssm_maintenance_window_target",
    "aws_ssm_maintenance_window_task",
    "aws_ssm_patch_group",
    "aws_ssm_resource_data_sync",
    "aws_ssm_service_setting",
    "aws_ssmcontacts_contact_channel",
    "aws_ssmcontacts_plan",
    "aws_ssoadmin_account_assignment",
    "aws_ssoadmin_application_access_scope",
    "aws_ssoadmin_application_assignment",
    "aws_ssoadmin_application_assignment_configuration",
    "aws_ssoadmin_customer_managed_policy_attachment",
    "aws_ssoadmin_instance_access_control_attributes",
    "aws_ssoadmin_managed_policy_attachment",
    "aws_ssoadmin_permission_set_inline_policy",
    "aws_ssoadmin_permissions_boundary_attachment",
    "aws_storagegateway_cache",
    "aws_storagegateway_upload_buffer",
    "aws_storagegateway_working_storage",
    "aws_synthetics_group_association",
    "aws_transfer_access",
    "aws_transfer_ssh_key",
    "aws_transfer_tag",
    "aws_transfer_web_app_customization",
    "aws_verifiedaccess_instance_logging_configuration",
    "aws_verifiedaccess_instance_trust_provider_attachment",
    "aws_verifiedpermissions_identity_source",
    "aws_verifiedpermissions_policy",
    "aws_verifiedpermissions_policy_template",
    "aws_verifiedpermissions_schema",
    "aws_volume_attachment",
    "aws_vpc_block_public_access_options",
    "aws_vpc_dhcp_options_association",
    "aws_vpc_endpoint_connection_accepter",
    "aws_vpc_endpoint_connection_notification",
    "aws_vpc_endpoint_policy",
    "aws_vpc_endpoint_private_dns",
    "aws_vpc_endpoint_route_table_association",
    "aws_vpc_endpoint_security_group_association",
    "aws_vpc_endpoint_service_allowed_principal",
    "aws_vpc_endpoint_service_private_dns_verification",
    "aws_vpc_endpoint_subnet_association",
    "aws_vpc_ipam_organization_admin_account",
    "aws_vpc_ipam_pool_cidr",
    "aws_vpc_ipam_pool_cidr_allocation",
    "aws_vpc_ipam_preview_next_cidr",
    "aws_vpc_ipv4_cidr_block_association",
    "aws_vpc_ipv6_cidr_block_association",
    "aws_vpc_network_performance_metric_subscription",
    "aws_vpc_peering_connection_options",
    "aws_vpc_route_server_propagation",
    "aws_vpc_route_server_vpc_association",
    "aws_vpc_security_group_vpc_association",
    "aws_vpclattice_auth_policy",
    "aws_vpclattice_resource_policy",
    "aws_vpclattice_target_group_attachment",
    "aws_vpn_connection_route",
    "aws_vpn_gateway_attachment",
    "aws_vpn_gateway_route_propagation",
    "aws_waf_byte_match_set",
    "aws_waf_geo_match_set",
    "aws_waf_ipset",
    "aws_waf_regex_match_set",
    "aws_waf_regex_pattern_set",
    "aws_waf_size_constraint_set",
    "aws_waf_sql_injection_match_set",
    "aws_waf_xss_match_set",
    "aws_wafregional_byte_match_set",
    "aws_wafregional_geo_match_set",
    "aws_wafregional_ipset",
    "aws_wafregional_regex_match_set",
    "aws_wafregional_regex_pattern_set",
    "aws_wafregional_size_constraint_set",
    "aws_wafregional_sql_injection_match_set",
    "aws_wafregional_web_acl_association",
    "aws_wafregional_xss_match_set",
    "aws_wafv2_api_key",
    "aws_wafv2_web_acl_association",
    "aws_wafv2_web_acl_logging_configuration",
    "aws_wafv2_web_acl_rule_group_association",
    "aws_workspacesweb_browser_settings_association",
    "aws_workspacesweb_data_protection_settings_association",
    "aws_workspacesweb_ip_access_settings_association",
    "aws_workspacesweb_network_settings_association",
    "aws_workspacesweb_session_logger_association",
    "aws_workspacesweb_trust_store_association",
    "aws_workspacesweb_user_access_logging_settings_association",
    "aws_workspacesweb_user_settings_association",
    "aws_xray_encryption_config",
    "aws_xray_resource_policy",
];
